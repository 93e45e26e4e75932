use std::io::Write;

use console::style;
use sqlx_mysqli::{ConnectParams, Link, Value, VarDump};

pub const TABLE: &str = "test_026_table_1";

pub const CHUNKS: [&str; 3] = [
    "This is the first sentence.",
    " And this is the second sentence.",
    " And finally this is the last sentence.",
];

/// Inserts `("Hello World", <three chunks>)` through a prepared statement, reads the row
/// back through bound result slots and dumps it, followed by `done!`.
///
/// No call is checked. A call that fails is reported as a warning and the scenario
/// carries on; result slots that were never fetched dump as `NULL`. This includes the
/// connection: without one, nothing runs and two `NULL`s are dumped.
pub fn long_data(params: &ConnectParams, out: &mut impl Write) -> anyhow::Result<()> {
    let mut test = vec![Value::Null, Value::Null];

    if let Some(mut link) = unchecked("connect", Link::connect(params)) {
        insert_and_fetch(&mut link, params, &mut test);

        unchecked("query", link.query(&format!("DROP TABLE IF EXISTS {TABLE}")));
        unchecked("close", link.close());
    }

    write!(out, "{}", VarDump(&test))?;
    writeln!(out, "done!")?;

    Ok(())
}

fn insert_and_fetch(link: &mut Link, params: &ConnectParams, test: &mut [Value]) {
    if !params.get_db().is_empty() {
        unchecked("select_db", link.select_db(params.get_db()));
    }

    unchecked("query", link.query("SET sql_mode=''"));
    unchecked("query", link.query(&format!("DROP TABLE IF EXISTS {TABLE}")));
    unchecked(
        "query",
        link.query(&format!("CREATE TABLE {TABLE}(c1 varchar(10), c2 text)")),
    );

    if let Some(mut stmt) = unchecked(
        "prepare",
        link.prepare(&format!("INSERT INTO {TABLE} VALUES (?,?)")),
    ) {
        unchecked("stmt_bind_param", stmt.bind_param("sb", [Value::Null, Value::Null]));
        unchecked("stmt_bind_param", stmt.set_param(0, "Hello World"));

        for chunk in CHUNKS {
            unchecked("stmt_send_long_data", stmt.send_long_data(1, chunk));
        }

        unchecked("stmt_execute", stmt.execute());
        stmt.close();
    }

    if let Some(mut stmt) = unchecked("prepare", link.prepare(&format!("SELECT * FROM {TABLE}"))) {
        unchecked("stmt_bind_result", stmt.bind_result(test.len()));
        unchecked("stmt_execute", stmt.execute());
        unchecked("stmt_fetch", stmt.fetch());

        for (slot, value) in test.iter_mut().zip(stmt.results()) {
            slot.clone_from(value);
        }

        stmt.close();
    }
}

/// Reconnects and drops the scenario table.
///
/// A failed connection is reported as `[c001] [errno] error` and the query is skipped.
pub fn drop_check(params: &ConnectParams, out: &mut impl Write) -> anyhow::Result<()> {
    let mut link = match Link::connect(params) {
        Ok(link) => link,
        Err(err) => {
            writeln!(out, "[c001] [{}] {}", err.errno(), err)?;
            return Ok(());
        }
    };

    drop_table(&mut link, &format!("DROP TABLE IF EXISTS {TABLE}"), out)?;

    if let Err(err) = link.close() {
        log::warn!("failed to close connection: {err}");
    }

    Ok(())
}

/// Runs `sql` on `link`; a failure is reported as `[c002] Cannot drop table, [errno] error`
/// from the link's last error.
pub fn drop_table(link: &mut Link, sql: &str, out: &mut impl Write) -> anyhow::Result<()> {
    if link.query(sql).is_err() {
        writeln!(
            out,
            "[c002] Cannot drop table, [{}] {}",
            link.errno(),
            link.error()
        )?;
    }

    Ok(())
}

/// Passes a successful result through; reports a failure the way PHP prints a warning.
fn unchecked<T>(call: &str, result: sqlx_mysqli::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!(
                "{} mysqli_{}(): ({}/{}): {}",
                style("warning:").bold().yellow(),
                call,
                err.sqlstate(),
                err.errno(),
                err
            );

            None
        }
    }
}

#[test]
fn chunks_concatenate_to_the_expected_sentence() {
    assert_eq!(
        CHUNKS.concat(),
        "This is the first sentence. And this is the second sentence. \
         And finally this is the last sentence."
    );
    assert_eq!(CHUNKS.concat().len(), 99);
}

#[test]
fn drop_check_reports_connect_failures_and_skips_the_query() {
    let params = ConnectParams::new().host("127.0.0.1").port(1);
    let mut out = Vec::new();

    drop_check(&params, &mut out).unwrap();

    let out = String::from_utf8(out).unwrap();

    assert!(out.starts_with("[c001] [2003] "), "{out}");
    assert!(!out.contains("[c002]"), "{out}");
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn long_data_dumps_nulls_when_it_cannot_connect() {
    let params = ConnectParams::new().host("127.0.0.1").port(1);
    let mut out = Vec::new();

    long_data(&params, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "array(2) {\n  [0]=>\n  NULL\n  [1]=>\n  NULL\n}\ndone!\n"
    );
}

#[test]
#[ignore = "requires a running MySQL server"]
fn drop_table_reports_query_failures() {
    let mut link = sqlx_mysqli_test::new().unwrap();
    let mut out = Vec::new();

    drop_table(&mut link, "DROP TABLE sqlx_mysqli_no_such_db.t", &mut out).unwrap();

    let out = String::from_utf8(out).unwrap();

    assert!(out.starts_with("[c002] Cannot drop table, ["), "{out}");
    assert!(
        out.contains(&format!("[{}] {}", link.errno(), link.error())),
        "{out}"
    );
    assert_ne!(link.errno(), 0);
    assert!(!link.error().is_empty());
}

#[test]
#[ignore = "requires a running MySQL server"]
fn drop_table_is_silent_when_the_table_is_missing() {
    let mut link = sqlx_mysqli_test::new().unwrap();
    let mut out = Vec::new();

    for _ in 0..2 {
        drop_table(&mut link, "DROP TABLE IF EXISTS sqlx_mysqli_never_created", &mut out).unwrap();
        assert_eq!(link.errno(), 0);
    }

    assert!(out.is_empty());
}
