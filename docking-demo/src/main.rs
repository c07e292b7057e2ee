use dear_dock::RunnerError;
use dear_dock::logging::{self, DEFAULT_LOG_CAPACITY};
use docking_demo::{AppState, runner_params};

fn main() -> Result<(), RunnerError> {
    let log = logging::init(
        "docking_demo=info,dear_dock=info,wgpu=warn",
        DEFAULT_LOG_CAPACITY,
    );
    dear_dock::run(runner_params(log), AppState::default())
}
