use crate::abs::{App, ShaderProgram};
use crate::render::Renderer;

mod abs;
mod logging;
mod render;

const WINDOW_TITLE: &str = "First OpenGL Project";
const WINDOW_WIDTH: u32 = 640;
const WINDOW_HEIGHT: u32 = 480;

const VERTEX_SHADER_PATH: &str = "./src/shaders/simple.vert";
const FRAGMENT_SHADER_PATH: &str = "./src/shaders/simple.frag";

fn main() {
    if let Err(e) = logging::init_logging(log::LevelFilter::Info) {
        eprintln!("Cannot install logger: {e}");
    }

    let mut app = match App::new(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let program = match ShaderProgram::from_files(&app.gl, VERTEX_SHADER_PATH, FRAGMENT_SHADER_PATH)
    {
        Ok(program) => program,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Linked shader program");

    Renderer::new(&mut app, &program).run();
}
