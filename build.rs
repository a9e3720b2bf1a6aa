use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `--version` shows VERGEN_BUILD_DATE and VERGEN_GIT_SHA.
    let build = BuildBuilder::default().build_date(true).build()?;
    let git2_result = Git2Builder::default().sha(true).build();

    // Source tarballs have no git metadata.
    if let Ok(git2) = git2_result {
        Emitter::default()
            .add_instructions(&build)?
            .add_instructions(&git2)?
            .emit()?;
    } else {
        println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        Emitter::default().add_instructions(&build)?.emit()?;
    }

    Ok(())
}
