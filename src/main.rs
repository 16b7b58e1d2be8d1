fn main() {
    if let Err(e) = flashchat::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
