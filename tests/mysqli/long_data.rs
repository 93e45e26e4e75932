use sqlx_mysqli::{var_dump, Value};
use sqlx_mysqli_test::{fresh_table, new};

const TABLE: &str = "sqlx_mysqli_long_data";

const CHUNKS: [&str; 3] = [
    "This is the first sentence.",
    " And this is the second sentence.",
    " And finally this is the last sentence.",
];

#[test]
#[ignore = "requires a running MySQL server"]
fn it_streams_long_data_in_chunks() -> anyhow::Result<()> {
    let mut link = new()?;

    link.query("SET sql_mode=''")?;
    fresh_table(&mut link, TABLE, "c1 varchar(10), c2 text")?;

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} VALUES (?,?)"))?;

    assert_eq!(stmt.param_count(), 2);

    stmt.bind_param("sb", [Value::Null, Value::Null])?;
    stmt.set_param(0, "Hello World")?;

    for chunk in CHUNKS {
        stmt.send_long_data(1, chunk)?;
    }

    stmt.execute()?;

    assert_eq!(stmt.affected_rows(), 1);
    stmt.close();

    let mut stmt = link.prepare(&format!("SELECT * FROM {TABLE}"))?;

    stmt.bind_result(2)?;

    assert_eq!(stmt.results(), [Value::Null, Value::Null]);

    stmt.execute()?;

    assert!(stmt.fetch()?);
    assert_eq!(stmt.num_rows(), 1);
    // c1 is varchar(10); with sql_mode='' the value is truncated instead of rejected
    assert_eq!(stmt.result(0), Some(&Value::from("Hello Worl")));
    assert_eq!(stmt.result(1).and_then(Value::as_str), Some(CHUNKS.concat().as_str()));

    assert_eq!(
        var_dump(stmt.results()),
        "array(2) {\n  \
           [0]=>\n  \
           string(10) \"Hello Worl\"\n  \
           [1]=>\n  \
           string(99) \"This is the first sentence. And this is the second sentence. \
                        And finally this is the last sentence.\"\n\
         }\n"
    );

    // no more rows; the slots keep the last row
    assert!(!stmt.fetch()?);
    assert_eq!(stmt.result(0), Some(&Value::from("Hello Worl")));

    stmt.close();

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;
    link.close()?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_discards_long_data_after_execute() -> anyhow::Result<()> {
    let mut link = new()?;

    fresh_table(&mut link, TABLE, "id int, c2 text")?;

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} VALUES (?,?)"))?;

    stmt.bind_param("ib", [Value::Int(1), Value::from("bound")])?;
    stmt.send_long_data(1, "streamed")?;
    stmt.execute()?;

    // the second execution falls back to the bound value
    stmt.set_param(0, 2)?;
    stmt.execute()?;
    stmt.close();

    let mut rows = link
        .query(&format!("SELECT c2 FROM {TABLE} ORDER BY id"))?
        .into_result_set()
        .expect("SELECT produces a result set");

    assert_eq!(rows.num_rows(), 2);
    assert_eq!(rows.fetch_row(), Some(vec![Value::from("streamed")]));
    assert_eq!(rows.fetch_row(), Some(vec![Value::from("bound")]));
    assert_eq!(rows.fetch_row(), None);

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}

#[test]
#[ignore = "requires a running MySQL server"]
fn it_streams_binary_data() -> anyhow::Result<()> {
    let mut link = new()?;

    fresh_table(&mut link, TABLE, "id int, c2 blob")?;

    let mut stmt = link.prepare(&format!("INSERT INTO {TABLE} VALUES (?,?)"))?;

    stmt.bind_param("ib", [Value::Int(1), Value::Null])?;
    stmt.send_long_data(1, [0xff_u8, 0x00])?;
    stmt.send_long_data(1, [0xfe_u8])?;
    stmt.execute()?;
    stmt.close();

    let mut stmt = link.prepare(&format!("SELECT c2 FROM {TABLE}"))?;

    stmt.bind_result(1)?;
    stmt.execute()?;

    assert!(stmt.fetch()?);
    assert_eq!(stmt.result(0), Some(&Value::Bytes(vec![0xff, 0x00, 0xfe])));

    stmt.close();

    link.query(&format!("DROP TABLE IF EXISTS {TABLE}"))?;

    Ok(())
}
