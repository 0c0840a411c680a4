/// Build number, injected by the release pipeline.
pub const BUILD_NUMBER: &str = match option_env!("TYPING_BUILD_NUMBER") {
    Some(build) => build,
    None => "1",
};

/// `Typing <version>-<build> <os>/<arch>`
pub fn version_string() -> String {
    format!(
        "Typing {}-{} {}/{}",
        env!("CARGO_PKG_VERSION"),
        BUILD_NUMBER,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
