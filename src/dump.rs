use std::fmt::{self, Display, Formatter, Write};

use crate::value::Value;

/// Renders values the way PHP's `var_dump()` prints an indexed array of scalars.
///
/// ```text
/// array(2) {
///   [0]=>
///   string(11) "Hello World"
///   [1]=>
///   int(42)
/// }
/// ```
///
/// String lengths are byte lengths.
pub struct VarDump<'a>(pub &'a [Value]);

/// Shorthand for `VarDump(values).to_string()`.
pub fn var_dump(values: &[Value]) -> String {
    VarDump(values).to_string()
}

impl Display for VarDump<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "array({}) {{", self.0.len())?;

        for (index, value) in self.0.iter().enumerate() {
            writeln!(f, "  [{index}]=>")?;
            f.write_str("  ")?;
            write_scalar(f, value)?;
            f.write_char('\n')?;
        }

        writeln!(f, "}}")
    }
}

fn write_scalar(f: &mut Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("NULL"),
        Value::Int(v) => write!(f, "int({v})"),

        Value::Double(v) if v.is_nan() => f.write_str("float(NAN)"),
        Value::Double(v) if v.is_infinite() => {
            f.write_str(if v.is_sign_negative() { "float(-INF)" } else { "float(INF)" })
        }
        Value::Double(v) => write!(f, "float({v})"),

        Value::String(s) => write!(f, "string({}) \"{s}\"", s.len()),
        Value::Bytes(b) => write!(f, "string({}) \"{}\"", b.len(), String::from_utf8_lossy(b)),
    }
}

#[test]
fn it_dumps_the_long_data_row() {
    let row = [
        Value::from("Hello World"),
        Value::from(
            "This is the first sentence. And this is the second sentence. \
             And finally this is the last sentence.",
        ),
    ];

    assert_eq!(
        var_dump(&row),
        "array(2) {\n  \
           [0]=>\n  \
           string(11) \"Hello World\"\n  \
           [1]=>\n  \
           string(99) \"This is the first sentence. And this is the second sentence. \
                        And finally this is the last sentence.\"\n\
         }\n"
    );
}

#[test]
fn it_dumps_scalars() {
    let values = [
        Value::Null,
        Value::Int(-7),
        Value::Double(1.5),
        Value::Double(2.0),
        Value::Double(f64::NEG_INFINITY),
        Value::Bytes(vec![b'a', 0, b'b']),
    ];

    let dump = var_dump(&values);
    let lines: Vec<&str> = dump.lines().collect();

    assert_eq!(lines[0], "array(6) {");
    assert_eq!(lines[2], "  NULL");
    assert_eq!(lines[4], "  int(-7)");
    assert_eq!(lines[6], "  float(1.5)");
    assert_eq!(lines[8], "  float(2)");
    assert_eq!(lines[10], "  float(-INF)");
    assert_eq!(lines[12], "  string(3) \"a\0b\"");
    assert_eq!(lines[13], "}");
}

#[test]
fn it_dumps_an_empty_array() {
    assert_eq!(var_dump(&[]), "array(0) {\n}\n");
}
