use sqlx_mysqli::{ClientError, Error, Value};
use sqlx_mysqli_test::{fresh_table, new};

const TABLE: &str = "sqlx_mysqli_error";

#[test]
#[ignore = "requires a running MySQL server"]
fn it_records_server_errors_on_the_link() -> anyhow::Result<()> {
    let mut link = new()?;

    let err = link.query("SELECT * FROM sqlx_mysqli_no_such_table").unwrap_err();

    // ER_NO_SUCH_TABLE
    assert_eq!(err.errno(), 1146);
    assert_eq!(err.sqlstate(), "42S02");
    assert!(matches!(err, Error::Server(_)));

    assert_eq!(link.errno(), 1146);
    assert_eq!(link.sqlstate(), "42S02");
    assert_eq!(link.error(), err.to_string());

    // the next successful call clears it
    link.query("SELECT 1")?;

    assert_eq!(link.errno(), 0);
    assert_eq!(link.error(), "");

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_reports_syntax_errors_from_prepare() -> anyhow::Result<()> {
    let mut link = new()?;

    let err = link.prepare("SELEC 1").err().expect("prepare should fail");

    // ER_PARSE_ERROR
    assert_eq!(err.errno(), 1064);
    assert_eq!(link.errno(), 1064);

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_rejects_misuse_of_a_statement() -> anyhow::Result<()> {
    let mut link = new()?;

    fresh_table(&mut link, TABLE, "c1 varchar(10), c2 text")?;

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} VALUES (?,?)"))?;

    let err = stmt.execute().unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::ParamsNotBound)));
    assert_eq!(stmt.errno(), 2031);

    let err = stmt.bind_param("s", ["only one"]).unwrap_err();
    assert_eq!(err.errno(), 2000);

    let err = stmt.bind_param("sx", ["a", "b"]).unwrap_err();
    assert!(matches!(err, Error::Client(ClientError::UnsupportedParamType('x'))));
    assert_eq!(stmt.errno(), 2036);

    stmt.bind_param("ss", ["a", "b"])?;
    assert_eq!(stmt.errno(), 0);

    let err = stmt.send_long_data(2, "out of range").unwrap_err();
    assert_eq!(err.errno(), 2034);
    assert_eq!(stmt.sqlstate(), "HY000");

    let err = stmt.fetch().unwrap_err();
    assert_eq!(err.errno(), 2053);

    stmt.close();

    let mut stmt = link.prepare(&format!("SELECT c1 FROM {TABLE}"))?;

    let err = stmt.fetch().unwrap_err();
    assert_eq!(err.errno(), 2014);

    let err = stmt.bind_result(2).unwrap_err();
    assert!(matches!(
        err,
        Error::Client(ClientError::FieldCountMismatch {
            expected: 1,
            actual: 2
        })
    ));

    stmt.close();

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_reports_constraint_violations_from_execute() -> anyhow::Result<()> {
    let mut link = new()?;

    fresh_table(&mut link, TABLE, "id int primary key")?;

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} VALUES (?)"))?;

    stmt.bind_param("i", [Value::Int(1)])?;
    stmt.execute()?;

    let err = stmt.execute().unwrap_err();

    // ER_DUP_ENTRY
    assert_eq!(err.errno(), 1062);
    assert_eq!(err.sqlstate(), "23000");
    assert_eq!(stmt.errno(), 1062);

    stmt.close();

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_discards_rows_of_the_previous_execution_on_failure() -> anyhow::Result<()> {
    let mut link = new()?;

    // more than one row from the subquery once the parameter differs from 1
    let mut stmt = link.prepare("SELECT (SELECT 1 UNION SELECT CAST(? AS SIGNED))")?;

    stmt.bind_param("i", [Value::Int(1)])?;
    stmt.bind_result(1)?;
    stmt.execute()?;

    assert_eq!(stmt.num_rows(), 1);

    stmt.set_param(0, 2)?;

    let err = stmt.execute().unwrap_err();

    // ER_SUBQUERY_NO_1_ROW
    assert_eq!(err.errno(), 1242);

    let err = stmt.fetch().unwrap_err();

    assert!(matches!(err, Error::Client(ClientError::CommandsOutOfSync)));

    stmt.close();

    Ok(())
}
