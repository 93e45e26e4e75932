use sqlx_mysqli::{ConnectParams, Link};
use sqlx_mysqli_test::{new, setup_if_needed, unreachable};

#[test]
fn it_reports_an_unreachable_server() {
    let err = Link::connect(&unreachable()).err().expect("connection should fail");

    assert_eq!(err.errno(), 2003);
    assert_eq!(err.sqlstate(), "HY000");
    assert!(
        err.to_string()
            .starts_with("Can't connect to MySQL server on '127.0.0.1:1'"),
        "{err}"
    );
    assert!(err.as_server_error().is_none());
}

#[test]
fn it_reports_an_unknown_host() {
    setup_if_needed();

    let params = ConnectParams::new().host("sqlx-mysqli-no-such-host.invalid");
    let err = Link::connect(&params).err().expect("connection should fail");

    assert_eq!(err.errno(), 2005);
    assert!(
        err.to_string()
            .starts_with("Unknown MySQL server host 'sqlx-mysqli-no-such-host.invalid'"),
        "{err}"
    );
}

#[cfg(unix)]
#[test]
fn it_reports_a_missing_socket() {
    setup_if_needed();

    let params = ConnectParams::new().socket("/nonexistent/mysqld.sock");
    let err = Link::connect(&params).err().expect("connection should fail");

    assert_eq!(err.errno(), 2002);
    assert!(err.to_string().contains("/nonexistent/mysqld.sock"), "{err}");
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_connects() -> anyhow::Result<()> {
    let mut link = new()?;

    link.ping()?;

    assert_eq!(link.errno(), 0);
    assert_eq!(link.error(), "");
    assert_eq!(link.sqlstate(), "00000");
    assert!(!link.server_info()?.is_empty());

    link.close()?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_rejects_bad_credentials() -> anyhow::Result<()> {
    let params = sqlx_mysqli_test::params()?
        .user("sqlx_mysqli_no_such_user")
        .passwd("wrong");

    let err = Link::connect(&params).err().expect("authentication should fail");

    // ER_ACCESS_DENIED_ERROR
    assert_eq!(err.errno(), 1045);
    assert_eq!(err.sqlstate(), "28000");
    assert!(err.as_server_error().is_some());

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_selects_a_database() -> anyhow::Result<()> {
    let mut link = new()?;
    let db = link.params().get_db().to_owned();

    link.select_db(&db)?;

    let mut rows = link
        .query("SELECT DATABASE()")?
        .into_result_set()
        .expect("SELECT produces a result set");

    assert_eq!(rows.fetch_row().unwrap()[0].as_str(), Some(db.as_str()));

    let err = link.select_db("sqlx_mysqli_no_such_db").unwrap_err();

    // ER_BAD_DB_ERROR
    assert_eq!(err.errno(), 1049);
    assert_eq!(link.errno(), 1049);
    assert_eq!(link.params().get_db(), db);

    Ok(())
}
