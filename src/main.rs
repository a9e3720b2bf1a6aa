fn main() {
    if let Err(err) = gyaan::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
