//! Koca build file parsing
//!
//! A koca build file is a Bash script restricted to a fixed schema:
//!
//! ```text
//! # Maintainer: Foo Bar <foo@example.com>
//! pkgname=hello
//! pkgver=1.0.0
//! pkgrel=1
//! arch=(x86_64)
//!
//! build() { make; }
//! package() { make DESTDIR="$pkgdir" install; }
//! ```
//!
//! Parsing runs in three passes:
//! 1. A [`grammar::ScriptGrammar`] turns the text into a generic statement tree
//! 2. The extractor routes every top-level statement to a variable, a function
//!    or an error
//! 3. The validator types the extracted values
//!
//! Syntax and maintainer problems stop parsing straight away. Everything else
//! is collected, so a failed parse returns every problem found in the file.

pub mod arch;
pub mod build_file;
pub mod errors;
pub mod extractor;
pub mod format;
pub mod grammar;
pub mod maintainer;
pub mod names;
pub mod validator;
pub mod version;

pub use arch::Arch;
pub use build_file::BuildFile;
pub use errors::{ErrorKind, ManifestError, ParseErrors, ParseResult};
pub use format::PackageFormat;
pub use maintainer::Maintainer;
pub use names::{FunctionKind, Variable};
pub use version::Version;
