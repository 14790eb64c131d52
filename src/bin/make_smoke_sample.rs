use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trip_duration::apps::run_make_smoke_sample(std::env::args().skip(1))
}
