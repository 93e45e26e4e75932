use sqlx_mysqli::{QueryResult, Value};
use sqlx_mysqli_test::{fresh_table, new};

const TABLE: &str = "sqlx_mysqli_query";

#[test]
#[ignore = "requires a running MySQL server"]
fn it_selects_scalars() -> anyhow::Result<()> {
    let mut link = new()?;

    let mut rows = link
        .query("SELECT 1 AS one, 1.5e0 AS half, 'text' AS word, NULL AS nothing")?
        .into_result_set()
        .expect("SELECT produces a result set");

    assert_eq!(rows.field_names(), ["one", "half", "word", "nothing"]);
    assert_eq!(
        rows.fetch_row(),
        Some(vec![
            Value::Int(1),
            Value::Double(1.5),
            Value::from("text"),
            Value::Null,
        ])
    );
    assert_eq!(rows.fetch_row(), None);

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_reports_affected_rows_and_insert_id() -> anyhow::Result<()> {
    let mut link = new()?;

    fresh_table(&mut link, TABLE, "id int auto_increment primary key, name text")?;

    let done = link.query(&format!("INSERT INTO {TABLE} (name) VALUES ('a'), ('b')"))?;

    assert_eq!(
        done,
        QueryResult::Done {
            affected_rows: 2,
            insert_id: 1
        }
    );
    assert_eq!(link.affected_rows(), 2);

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} (name) VALUES (?)"))?;

    stmt.bind_param("s", ["c"])?;
    stmt.execute()?;

    assert_eq!(stmt.affected_rows(), 1);
    assert_eq!(stmt.insert_id(), 3);

    stmt.close();

    let mut rows = link
        .query(&format!("SELECT id, name FROM {TABLE} ORDER BY id"))?
        .into_result_set()
        .expect("SELECT produces a result set");

    assert_eq!(rows.num_rows(), 3);
    assert_eq!(
        rows.fetch_assoc(),
        Some(vec![
            ("id".to_owned(), Value::Int(1)),
            ("name".to_owned(), Value::from("a")),
        ])
    );

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_reexecutes_with_new_parameters() -> anyhow::Result<()> {
    let mut link = new()?;

    let mut stmt = link.prepare("SELECT CAST(? AS SIGNED) + 1")?;

    stmt.bind_param("i", [Value::Int(1)])?;
    stmt.bind_result(1)?;

    for n in 1..=3 {
        stmt.set_param(0, n)?;
        stmt.execute()?;

        assert!(stmt.fetch()?);
        assert_eq!(stmt.result(0).and_then(Value::as_i64), Some(i64::from(n) + 1));
    }

    stmt.reset();
    assert!(stmt.fetch().is_err());

    stmt.close();

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_reads_zero_dates_and_long_times() -> anyhow::Result<()> {
    let mut link = new()?;

    link.query("SET sql_mode=''")?;
    fresh_table(&mut link, TABLE, "d date, dt datetime, t time")?;
    link.query(&format!(
        "INSERT INTO {TABLE} VALUES ('0000-00-00', '0000-00-00 00:00:00', '-100:00:00')"
    ))?;

    let expected = vec![
        Value::from("0000-00-00"),
        Value::from("0000-00-00 00:00:00"),
        Value::from("-100:00:00"),
    ];

    // text protocol
    let mut rows = link
        .query(&format!("SELECT d, dt, t FROM {TABLE}"))?
        .into_result_set()
        .expect("SELECT produces a result set");

    assert_eq!(rows.fetch_row(), Some(expected.clone()));

    // binary protocol
    let mut stmt = link.prepare(&format!("SELECT d, dt, t FROM {TABLE}"))?;

    stmt.bind_result(3)?;
    stmt.execute()?;

    assert!(stmt.fetch()?);
    assert_eq!(stmt.results(), expected);

    stmt.close();

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_drops_a_missing_table_repeatedly() -> anyhow::Result<()> {
    let mut link = new()?;

    for _ in 0..2 {
        link.query("DROP TABLE IF EXISTS sqlx_mysqli_never_created")?;

        assert_eq!(link.errno(), 0);
        assert_eq!(link.error(), "");
    }

    Ok(())
}
