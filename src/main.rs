fn main() {
    if let Err(err) = colnames::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
