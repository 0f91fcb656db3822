//! Result display and source-code printing.

use std::fmt::{self, Write as _};

use crate::format::{code_number, number};
use crate::{Complex, Matrix};

use super::{Payload, Value};

impl Value {
    /// Echo form used when a statement result is shown: `x = 5` for
    /// scalars and single-line strings, a blank-line framed block for
    /// matrices.
    pub fn print_with_name(&self, name: &str) -> String {
        let body = self.to_string();
        let single_line = match self.payload() {
            Payload::RealScalar(_)
            | Payload::ComplexScalar(_)
            | Payload::MagicColon
            | Payload::AllVaArgs
            | Payload::Undefined => true,
            Payload::String(m) | Payload::CharMatrix(m) => m.rows() <= 1,
            _ => self.is_empty(),
        };
        if single_line {
            format!("{name} = {}\n", body.trim_start())
        } else {
            format!("{name} =\n\n{body}\n\n")
        }
    }

    /// Source form of the value. Uses the stashed original text when
    /// there is one.
    pub fn print_code(&self) -> String {
        if let Some(text) = self.original_text() {
            return text.to_string();
        }
        match self.payload() {
            Payload::Undefined => "<undefined>".to_string(),
            Payload::RealScalar(x) => code_number(*x),
            Payload::ComplexScalar(z) => code_complex(*z),
            Payload::RealMatrix(m) => code_matrix(m, |x| code_number(*x)),
            Payload::ComplexMatrix(m) => code_matrix(m, |z| code_complex(*z)),
            Payload::CharMatrix(m) | Payload::String(m) => {
                let rows: Vec<String> = (0..m.rows())
                    .map(|r| format!("\"{}\"", escape(&m.row_string(r))))
                    .collect();
                match rows.as_slice() {
                    [] => "\"\"".to_string(),
                    [single] => single.clone(),
                    _ => format!("[{}]", rows.join("; ")),
                }
            }
            Payload::Range(r) => {
                if r.increment == 1.0 {
                    format!("{}:{}", code_number(r.base), code_number(r.limit))
                } else {
                    format!(
                        "{}:{}:{}",
                        code_number(r.base),
                        code_number(r.increment),
                        code_number(r.limit)
                    )
                }
            }
            Payload::Map(_) => "<struct>".to_string(),
            Payload::MagicColon => ":".to_string(),
            Payload::AllVaArgs => "all_va_args".to_string(),
        }
    }
}

fn code_complex(z: Complex) -> String {
    if z.re == 0.0 {
        format!("{}i", code_number(z.im))
    } else {
        let sign = if z.im.is_sign_negative() { '-' } else { '+' };
        format!("{} {sign} {}i", code_number(z.re), code_number(z.im.abs()))
    }
}

fn code_matrix<T>(m: &Matrix<T>, cell: impl Fn(&T) -> String) -> String {
    let rows: Vec<String> = (0..m.rows())
        .map(|r| m.row(r).map(&cell).collect::<Vec<_>>().join(", "))
        .collect();
    format!("[{}]", rows.join("; "))
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Right-aligned columns, two leading blanks per row.
fn write_grid<T>(
    f: &mut fmt::Formatter<'_>,
    m: &Matrix<T>,
    cell: impl Fn(&T) -> String,
) -> fmt::Result {
    if m.is_empty() {
        return write!(f, "[]({}x{})", m.rows(), m.cols());
    }
    let cells: Vec<String> = m.elements().iter().map(cell).collect();
    let width = cells.iter().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for r in 0..m.rows() {
        if r > 0 {
            out.push('\n');
        }
        for c in 0..m.cols() {
            write!(out, "  {:>width$}", cells[c * m.rows() + r])?;
        }
    }
    f.write_str(&out)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Payload::Undefined => f.write_str("<undefined>"),
            Payload::RealScalar(x) => f.write_str(&number(*x)),
            Payload::ComplexScalar(z) => write!(f, "{z}"),
            Payload::RealMatrix(m) => write_grid(f, m, |x| number(*x)),
            Payload::ComplexMatrix(m) => write_grid(f, m, ToString::to_string),
            Payload::Range(r) => write_grid(f, &r.matrix_value(), |x| number(*x)),
            Payload::CharMatrix(m) | Payload::String(m) => {
                let rows: Vec<String> = (0..m.rows()).map(|r| m.row_string(r)).collect();
                f.write_str(&rows.join("\n"))
            }
            Payload::Map(map) => {
                writeln!(f, "{{")?;
                for (name, value) in map.iter() {
                    writeln!(f, "  {name} = {}", value.to_string().trim_start())?;
                }
                f.write_str("}")
            }
            Payload::MagicColon => f.write_str(":"),
            Payload::AllVaArgs => f.write_str("all_va_args"),
        }
    }
}
