use std::collections::BTreeSet;

use minel_core::{with_resolved, MinelError, Value};

use crate::reader::read_many;

/// Every symbol name in `source` accepted by `pred`, without evaluating
/// anything. Quoted data and dotted tails are searched too.
pub fn scan_identifiers<F>(source: &str, pred: F) -> Result<BTreeSet<String>, MinelError>
where
    F: Fn(&str) -> bool,
{
    let mut found = BTreeSet::new();
    let mut pending = read_many(source)?;
    while let Some(form) = pending.pop() {
        match form {
            Value::Symbol(spur) => with_resolved(spur, |name| {
                if pred(name) {
                    found.insert(name.to_string());
                }
            }),
            Value::Cons(cell) => {
                let pair = cell.borrow();
                pending.push(pair.car.clone());
                pending.push(pair.cdr.clone());
            }
            Value::Quoted(inner) => pending.push((*inner).clone()),
            _ => {}
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_matching_symbols_everywhere() {
        let src = "(defun room-a () (goto 'room-b)) (setq x '(room-c . room-d)) \"room-e\"";
        let rooms = scan_identifiers(src, |s| s.starts_with("room-")).unwrap();
        let names: Vec<_> = rooms.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["room-a", "room-b", "room-c", "room-d"]);
    }

    #[test]
    fn nil_and_t_are_not_symbols() {
        let all = scan_identifiers("(if t nil foo)", |_| true).unwrap();
        assert!(all.contains("foo"));
        assert!(all.contains("if"));
        assert!(!all.contains("nil"));
        assert!(!all.contains("t"));
    }

    #[test]
    fn parse_errors_propagate() {
        assert!(scan_identifiers("(unclosed", |_| true).is_err());
    }
}
