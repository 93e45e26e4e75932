use std::io;

use crate::opt::Command;

mod opt;
pub mod scenario;

pub use crate::opt::Opt;

/// Loads `.env` unless `--no-dotenv` was passed.
///
/// Runs before Clap so that variables from `.env` can feed the `env = "..."` defaults.
pub fn maybe_apply_dotenv() {
    if std::env::args().any(|arg| arg == "--no-dotenv") {
        return;
    }

    dotenvy::dotenv().ok();
}

pub fn run(opt: Opt) -> anyhow::Result<()> {
    let params = opt.connect.to_params()?;

    log::debug!(
        "running {:?} against {}:{}",
        opt.command.unwrap_or(Command::All),
        params.get_host(),
        params.get_port()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match opt.command.unwrap_or(Command::All) {
        Command::LongData => scenario::long_data(&params, &mut out)?,
        Command::DropCheck => scenario::drop_check(&params, &mut out)?,
        Command::All => {
            scenario::long_data(&params, &mut out)?;
            scenario::drop_check(&params, &mut out)?;
        }
    }

    Ok(())
}
