fn main() {
    jitvue_cli::run();
}
