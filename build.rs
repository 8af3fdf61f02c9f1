//! Build script for logstitch
//!
//! Dev builds get `VERGEN_GIT_SHA` so `--version` names the commit. Builds
//! with the `release` feature skip git entirely and report the bare version.

fn main() {
    #[cfg(not(feature = "release"))]
    emit_git_sha();
}

#[cfg(not(feature = "release"))]
fn emit_git_sha() {
    use vergen_gitcl::{Emitter, GitclBuilder};

    let emitted = GitclBuilder::default()
        .sha(true)
        .build()
        .map_err(|e| e.to_string())
        .and_then(|git| {
            Emitter::default()
                .add_instructions(&git)
                .and_then(|emitter| emitter.emit())
                .map_err(|e| e.to_string())
        });

    // Outside a git checkout (e.g. a crates.io tarball) there is no SHA.
    if let Err(e) = emitted {
        println!("cargo:warning=Failed to get git info: {}", e);
        println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
    }
}
