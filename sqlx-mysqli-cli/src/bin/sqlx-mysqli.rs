use clap::Parser;
use console::style;
use sqlx_mysqli_cli::Opt;

fn main() {
    // Checks for `--no-dotenv` before parsing.
    sqlx_mysqli_cli::maybe_apply_dotenv();

    env_logger::init();

    let opt = Opt::parse();

    if let Err(error) = sqlx_mysqli_cli::run(opt) {
        println!("{} {}", style("error:").bold().red(), error);
        std::process::exit(1);
    }
}
