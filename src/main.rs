fn main() {
    clarity_testgen::cli::run();
}
