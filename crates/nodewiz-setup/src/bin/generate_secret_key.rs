//! Print a freshly generated `SECRET_KEY`.

use nodewiz_setup::secret;

fn main() {
  let key = secret::generate();
  println!("🔑 Your new secret key:");
  println!("SECRET_KEY={key}");
  println!();
  println!("💡 Use this in your Heroku config:");
  println!("{}", secret::heroku_command(&key));
  println!();
  println!("⚠️  Keep this secret and never commit it to version control!");
}
