use pb::{app, arguments};

fn main() {
    let code = match arguments::parse_args() {
        Ok(cmdline) => app::run(&cmdline),
        Err(e) => {
            eprintln!("pb: {}", e);
            eprintln!("type 'pb help' for usage");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
