use minel_core::{eq_value, equal_value, MinelError, Value};

use crate::{arg, eval_args, expect_index, expect_list, register_fn};

pub fn register(env: &minel_core::Env) {
    register_fn(env, "car", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        arg(&args, 0).car()
    });

    register_fn(env, "cdr", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        arg(&args, 0).cdr()
    });

    register_fn(env, "cadr", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        arg(&args, 0).cdr()?.car()
    });

    register_fn(env, "list", |ctx, args, env| {
        Ok(Value::list(eval_args(ctx, args, env)?))
    });

    register_fn(env, "nth", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let n = expect_index(&arg(&args, 0))?;
        expect_list(&arg(&args, 1))?.nth(n)
    });

    register_fn(env, "nthcdr", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let n = expect_index(&arg(&args, 0))?;
        expect_list(&arg(&args, 1))?.nthcdr(n)
    });

    // Destructive: the second list becomes the tail of the first.
    register_fn(env, "append", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let head = arg(&args, 0);
        let tail = arg(&args, 1);
        let Value::Cons(first) = expect_list(&head)? else {
            return Ok(tail);
        };
        let mut last = first.clone();
        loop {
            let next = match &last.borrow().cdr {
                Value::Cons(next) => next.clone(),
                _ => break,
            };
            last = next;
        }
        last.borrow_mut().cdr = tail;
        Ok(head)
    });

    register_fn(env, "assq", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let key = arg(&args, 0);
        for entry in expect_list(&arg(&args, 1))?.iter() {
            let entry = entry?;
            if eq_value(&key, &entry.car()?) {
                return Ok(entry);
            }
        }
        Ok(Value::Nil)
    });

    register_fn(env, "member", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let elt = arg(&args, 0);
        let mut cursor = expect_list(&arg(&args, 1))?.clone();
        while !cursor.is_nil() {
            if equal_value(&elt, &cursor.car()?) {
                return Ok(cursor);
            }
            cursor = cursor.cdr()?;
        }
        Ok(Value::Nil)
    });

    register_fn(env, "rplaca", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let cell = arg(&args, 0);
        let new_car = arg(&args, 1);
        match &cell {
            Value::Cons(c) => {
                c.borrow_mut().car = new_car.clone();
                Ok(new_car)
            }
            other => Err(MinelError::type_error_with_value(
                "cons",
                other.type_name(),
                other,
            )),
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::test_util::{eval_str, show};
    use minel_core::MinelError;

    #[test]
    fn test_car_cdr_cadr() {
        assert_eq!(show("(car '(1 2))"), "1");
        assert_eq!(show("(cdr '(1 2))"), "(2)");
        assert_eq!(show("(cadr '(1 2))"), "2");
        assert_eq!(show("(car nil)"), "nil");
        assert_eq!(show("(cdr nil)"), "nil");
        assert_eq!(show("(cadr '(1))"), "nil");
    }

    #[test]
    fn test_car_of_atom_is_type_error() {
        assert!(matches!(eval_str("(car 5)"), Err(MinelError::Type { .. })));
        assert!(matches!(eval_str("(cdr \"s\")"), Err(MinelError::Type { .. })));
    }

    #[test]
    fn test_dotted_pair_decomposes() {
        assert_eq!(show("(car '(a . b))"), "a");
        assert_eq!(show("(cdr '(a . b))"), "b");
    }

    #[test]
    fn test_list() {
        assert_eq!(show("(list 1 (+ 1 1) 'x)"), "(1 2 x)");
        assert_eq!(show("(list)"), "nil");
    }

    #[test]
    fn test_nth_and_nthcdr() {
        assert_eq!(show("(nth 1 '(a b c))"), "b");
        assert_eq!(show("(nth 5 '(a b c))"), "nil");
        assert_eq!(show("(nthcdr 1 '(a b c))"), "(b c)");
        assert_eq!(show("(nthcdr 9 '(a b c))"), "nil");
        assert!(matches!(eval_str("(nth 0 5)"), Err(MinelError::Type { .. })));
    }

    #[test]
    fn test_append_is_destructive() {
        assert_eq!(
            show("(setq a (list 1 2)) (append a '(3 4)) a"),
            "(1 2 3 4)"
        );
        assert_eq!(show("(append nil '(1))"), "(1)");
        assert_eq!(show("(append '(1) nil)"), "(1)");
    }

    #[test]
    fn test_assq_uses_identity() {
        assert_eq!(show("(assq 'b '((a . 1) (b . 2)))"), "(b . 2)");
        assert_eq!(show("(assq 'z '((a . 1)))"), "nil");
        assert_eq!(show("(assq \"a\" '((\"a\" . 1)))"), "nil");
    }

    #[test]
    fn test_member_uses_structural_equality() {
        assert_eq!(show("(member \"b\" '(\"a\" \"b\" \"c\"))"), "(\"b\" \"c\")");
        assert_eq!(show("(member 'z '(a b))"), "nil");
    }

    #[test]
    fn test_rplaca_mutates_shared_cell() {
        assert_eq!(show("(setq l (list 1 2)) (setq m l) (rplaca m 'x) l"), "(x 2)");
        assert!(matches!(eval_str("(rplaca nil 1)"), Err(MinelError::Type { .. })));
    }
}
