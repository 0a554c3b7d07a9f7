use assert_cmd::Command;
use nodewiz_setup::secret::{ALPHABET, KEY_LEN};
use predicates::str::contains;

fn cmd() -> Command { Command::cargo_bin("generate-secret-key").unwrap() }

fn printed_key() -> String {
  let output = cmd().output().unwrap();
  assert!(output.status.success());
  let stdout = String::from_utf8(output.stdout).unwrap();
  stdout
    .lines()
    .find_map(|line| line.strip_prefix("SECRET_KEY="))
    .expect("SECRET_KEY line")
    .to_owned()
}

#[test]
fn prints_key_heroku_line_and_warning() {
  cmd()
    .assert()
    .success()
    .stdout(contains("SECRET_KEY="))
    .stdout(contains("heroku config:set SECRET_KEY='"))
    .stdout(contains("never commit it to version control"));
}

#[test]
fn key_line_and_heroku_line_agree() {
  let output = cmd().output().unwrap();
  let stdout = String::from_utf8(output.stdout).unwrap();
  let key = stdout
    .lines()
    .find_map(|line| line.strip_prefix("SECRET_KEY="))
    .unwrap();
  assert!(stdout.contains(&format!("heroku config:set SECRET_KEY='{key}'")));
}

#[test]
fn key_uses_the_alphabet() {
  let key = printed_key();
  assert_eq!(key.len(), KEY_LEN);
  assert!(key.bytes().all(|b| ALPHABET.contains(&b)), "{key}");
}

#[test]
fn each_run_prints_a_new_key() {
  assert_ne!(printed_key(), printed_key());
}
