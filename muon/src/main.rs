use clap::Parser;
use muon_cli::Muon;

fn main() {
    let cli = Muon::parse();
    if cli.verbose {
        muon_cli::system::enable_verbose();
    }
    if cli.locations {
        muon_core::diagnostics::set_show_locations(true);
    }
    if let Err(e) = cli.run() {
        e.print();
        std::process::exit(1);
    }
}
