use console::style;

fn main() {
    match cdflow::run() {
        Ok(status) => std::process::exit(status),
        Err(e) => {
            eprintln!("{} {e:#}", style("Error:").red().bold());
            std::process::exit(1);
        }
    }
}
