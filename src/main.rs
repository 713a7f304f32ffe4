use raypack::App;
use std::env;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let mut app = App::default();
    app.parse_args(args)?;
    app.run()
}
