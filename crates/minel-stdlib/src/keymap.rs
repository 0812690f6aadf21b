use minel_core::{eq_value, MinelError, Value};

use crate::{arg, eval_args, expect_string, register_fn};

/// Slots in a full keymap's character table.
const FULL_KEYMAP_SIZE: usize = 256;

fn keymap_tag() -> Value {
    Value::symbol("keymap")
}

fn expect_keymap(v: &Value) -> Result<(), MinelError> {
    match v {
        Value::Cons(cell) if eq_value(&cell.borrow().car, &keymap_tag()) => Ok(()),
        other => Err(MinelError::type_error_with_value(
            "keymap",
            other.type_name(),
            other,
        )),
    }
}

/// Store `def` under `code`: into the table slot of a full keymap, or as a
/// `(code . def)` entry of a sparse one.
fn define_key(keymap: &Value, code: u32, def: Value) -> Result<(), MinelError> {
    expect_keymap(keymap)?;
    if let Value::Vector(table) = keymap.cdr()?.car()? {
        let mut table = table.borrow_mut();
        let len = table.len();
        let slot = table.get_mut(code as usize).ok_or_else(|| {
            MinelError::eval(format!("key code {code} outside keymap of size {len}"))
        })?;
        *slot = def;
        return Ok(());
    }

    let key = Value::Number(code as f64);
    let mut cell = keymap.clone();
    loop {
        let rest = cell.cdr()?;
        if rest.is_nil() {
            if let Value::Cons(last) = &cell {
                last.borrow_mut().cdr = Value::list(vec![Value::cons(key, def)]);
            }
            return Ok(());
        }
        if let Value::Cons(entry) = rest.car()? {
            if eq_value(&entry.borrow().car, &key) {
                entry.borrow_mut().cdr = def;
                return Ok(());
            }
        }
        cell = rest;
    }
}

pub fn register(env: &minel_core::Env) {
    register_fn(env, "make-sparse-keymap", |_ctx, _args, _env| {
        Ok(Value::list(vec![keymap_tag()]))
    });

    register_fn(env, "make-keymap", |_ctx, _args, _env| {
        Ok(Value::list(vec![
            keymap_tag(),
            Value::vector(vec![Value::Nil; FULL_KEYMAP_SIZE]),
        ]))
    });

    // (define-key KEYMAP KEY DEF), keyed on KEY's first character.
    register_fn(env, "define-key", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let keymap = arg(&args, 0);
        let key = expect_string(&arg(&args, 1))?;
        let code = key
            .chars()
            .next()
            .ok_or_else(|| MinelError::eval("define-key: empty key"))? as u32;
        let def = arg(&args, 2);
        define_key(&keymap, code, def.clone())?;
        Ok(def)
    });
}

#[cfg(test)]
mod tests {
    use crate::test_util::{eval_str, show};
    use minel_core::MinelError;

    #[test]
    fn test_make_sparse_keymap() {
        assert_eq!(show("(make-sparse-keymap)"), "(keymap)");
    }

    #[test]
    fn test_make_keymap_has_full_table() {
        assert!(eval_str("(aref (cadr (make-keymap)) 255)").unwrap().is_nil());
        assert!(matches!(
            eval_str("(aref (cadr (make-keymap)) 256)"),
            Err(MinelError::Eval(_))
        ));
    }

    #[test]
    fn test_define_key_sparse_appends_and_updates() {
        let src = "(setq km (make-sparse-keymap))
                   (define-key km \"a\" 'first)
                   (define-key km \"b\" 'second)
                   (define-key km \"a\" 'again)
                   km";
        assert_eq!(show(src), "(keymap (97 . again) (98 . second))");
    }

    #[test]
    fn test_define_key_full_keymap_sets_slot() {
        let src = "(setq km (make-keymap))
                   (define-key km \"\\r\" 'dun-parse)
                   (aref (cadr km) 13)";
        assert_eq!(show(src), "dun-parse");
    }

    #[test]
    fn test_define_key_returns_def() {
        assert_eq!(show("(define-key (make-sparse-keymap) \"x\" 'cmd)"), "cmd");
    }

    #[test]
    fn test_define_key_rejects_non_keymaps() {
        assert!(matches!(
            eval_str("(define-key '(a b) \"x\" 'cmd)"),
            Err(MinelError::Type { .. })
        ));
        assert!(matches!(
            eval_str("(define-key (make-sparse-keymap) \"\" 'cmd)"),
            Err(MinelError::Eval(_))
        ));
    }
}
