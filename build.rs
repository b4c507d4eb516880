use anyhow::Result;
use git2_rs::Repository;

fn git_short_sha() -> Option<String> {
    let repo = Repository::discover(std::env::current_dir().ok()?).ok()?;
    let ref_head = repo.revparse_single("HEAD").ok()?;
    let git_sha_buf = ref_head.short_id().ok()?;
    git_sha_buf.as_str().map(str::to_string)
}

fn main() -> Result<()> {
    let pkg_version = std::env::var("CARGO_PKG_VERSION")?;
    let mut version = format!("Reckometer v{}", pkg_version);

    if pkg_version.contains("-dev") {
        if let Some(git_short_sha) = git_short_sha() {
            version = format!("{} ({})", version, git_short_sha);
        }
    }

    println!("cargo:rustc-env=RECKOMETER_VERSION={}", version);
    Ok(())
}
