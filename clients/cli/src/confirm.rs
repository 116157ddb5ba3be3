use anyhow::Result;
use basecamp_client::listing::{is_confirmation, CONFIRMATION_WORD};

static ACCEPTABLE_YES: &[&str] = &["y", "yes", "Y", "YES"];

pub fn confirm_fn<T>(always_yes: bool, msg: T) -> Result<bool>
where
    T: AsRef<str>,
{
    if always_yes {
        return Ok(true);
    }
    let answer = rprompt::prompt_reply(format!("{} [y/N] ", msg.as_ref()))?;
    Ok(ACCEPTABLE_YES.contains(&answer.as_str()))
}

/// Asks the user to type the confirmation word before something
/// irreversible happens.
pub fn typed_confirm_fn<T>(always_yes: bool, msg: T) -> Result<bool>
where
    T: AsRef<str>,
{
    if always_yes {
        return Ok(true);
    }
    let answer = rprompt::prompt_reply(format!(
        "{} Type '{CONFIRMATION_WORD}' to continue: ",
        msg.as_ref()
    ))?;
    Ok(is_confirmation(&answer))
}

#[rustfmt::skip]
macro_rules! confirm_or_abort {
    ($opts:ident, $($arg:tt)*) => {{
        let res = ::std::format!($($arg)*);
        if !$crate::confirm::confirm_fn($opts.yes, res)? {
            return Err(::anyhow::anyhow!("Aborted!"));
        }
    }}
}

pub(crate) use confirm_or_abort;
