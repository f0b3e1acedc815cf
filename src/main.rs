fn main() {
    socra::app::cli::run();
}
