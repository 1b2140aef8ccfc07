use kvsweep::error::AppResult;

fn main() -> AppResult<()> {
    kvsweep::entry::run()
}
