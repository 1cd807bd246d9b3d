use anyhow::{Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "KEYSTORE_MAC_PASSWORD";

pub fn read_password() -> Result<Zeroizing<String>> {
    //  KEYSTORE_MAC_PASSWORD="changeit" keystore-mac verify ...
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    //  echo "changeit" | keystore-mac verify ...
    if !io::stdin().is_terminal() {
        return password_from_stdin();
    }

    let pw = Zeroizing::new(rpassword::prompt_password("Keystore password: ")?);
    if pw.is_empty() {
        bail!("No password provided");
    }
    Ok(pw)
}

/// Like [`read_password`], but asks twice on a terminal.
pub fn read_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    if !io::stdin().is_terminal() {
        return password_from_stdin();
    }

    let pw1 = Zeroizing::new(rpassword::prompt_password("New keystore password: ")?);
    let pw2 = Zeroizing::new(rpassword::prompt_password("Confirm password: ")?);

    if pw1.is_empty() {
        bail!("password cannot be empty");
    }
    if pw1 != pw2 {
        bail!("passwords do not match");
    }
    Ok(pw1)
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn password_from_stdin() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    io::stdin().read_line(&mut buf)?;
    trim_newline(&mut buf);

    if buf.is_empty() {
        bail!("No password provided");
    }
    Ok(buf)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
