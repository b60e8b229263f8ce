use normcheck_kernel::StandardsProfile;

pub fn run() {
    let rendered = StandardsProfile::default()
        .to_toml_string()
        .unwrap_or_else(|err| {
            eprintln!("error: {err}");
            std::process::exit(2);
        });
    print!("{rendered}");
}
