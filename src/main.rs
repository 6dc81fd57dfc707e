fn main() {
    if let Err(err) = labelrun::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
