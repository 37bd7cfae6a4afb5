fn main() -> std::process::ExitCode {
    figsnap_lib::run()
}
