use minel_core::Value;

use crate::{arg, eval_args, expect_string, register_fn};

pub fn register(env: &minel_core::Env) {
    register_fn(env, "send-string-to-terminal", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let text = expect_string(&arg(&args, 0))?;
        ctx.print(&text);
        Ok(Value::Nil)
    });

    // (read-from-minibuffer PROMPT [INITIAL KEYMAP]); INITIAL and KEYMAP
    // are evaluated but otherwise unused.
    register_fn(env, "read-from-minibuffer", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let prompt = expect_string(&arg(&args, 0))?;
        if !prompt.is_empty() {
            ctx.print(&prompt);
        }
        let mut line = ctx.read_line()?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::string_owned(line))
    });

    register_fn(env, "debug", |ctx, args, env| {
        let args = eval_args(ctx, args, env)?;
        let rendered = arg(&args, 0).to_string();
        tracing::debug!(target: "minel::script", "{rendered}");
        ctx.debug(&rendered);
        Ok(Value::Nil)
    });

    register_fn(env, "kill-emacs", |ctx, args, env| {
        eval_args(ctx, args, env)?;
        Err(ctx.exit())
    });
}
