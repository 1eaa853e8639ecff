mod app;
mod settings;

mod workers {
    pub mod annotation_worker;
}

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Face Annotate")
        .window(iced::window::Settings {
            size: iced::Size::new(760.0, 640.0),
            ..Default::default()
        })
        .run()
}
