fn main() {
    shaderpp::cli::run();
}
