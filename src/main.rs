fn main() {
    twig_ast::cli::run()
}
