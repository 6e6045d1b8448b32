use std::error::Error;
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    // Re-run on any change under the crate so the describe string stays current
    let emitted = EmitBuilder::builder()
        .fail_on_error()
        .custom_build_rs(".")
        .git_sha(true)
        .git_describe(true, true, None)
        .emit();
    if emitted.is_err() {
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }
    Ok(())
}
