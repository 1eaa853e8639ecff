use std::path::PathBuf;

use iced::widget::{button, center, checkbox, column, container, image, row, slider, text, Space};
use iced::{Element, Length, Task};

use face_annotate_core::pipeline::annotation_pipeline::PickerOutcome;
use face_annotate_core::shared::constants::IMAGE_EXTENSIONS;
use face_annotate_core::shared::raster_image::RasterImage;

use crate::settings::Settings;
use crate::workers::annotation_worker::{self, RunInput, RunReport, WorkerMessage};

#[derive(Debug, Clone)]
pub enum Message {
    ProcessDefault,
    PickImage,
    ImagePicked(Option<PathBuf>),
    DownloadProgress(u64, u64),
    RunFinished(RunReport),
    WorkerClosed,
    DismissNotice,
    ConfidenceChanged(f64),
    MinFaceSizeChanged(f64),
    LandmarksToggled(bool),
}

pub struct App {
    settings: Settings,
    displayed: Option<image::Handle>,
    status: String,
    notice: Option<String>,
    busy: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                settings: Settings::load(),
                displayed: None,
                status: "Process the sample image or pick one of your own.".into(),
                notice: None,
                busy: false,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ProcessDefault => return self.start(RunInput::Default),
            Message::PickImage => {
                if !self.accepts_input() {
                    return Task::none();
                }
                self.busy = true;
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Pick an image")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::ImagePicked,
                );
            }
            Message::ImagePicked(picked) => {
                self.busy = false;
                let outcome = match picked {
                    Some(path) => PickerOutcome::Selected(path),
                    None => PickerOutcome::Cancelled,
                };
                return self.start(RunInput::Picked(outcome));
            }
            Message::DownloadProgress(downloaded, total) => {
                self.status = download_status(downloaded, total);
            }
            Message::RunFinished(report) => self.finish(report),
            Message::WorkerClosed => {
                if self.busy {
                    self.busy = false;
                    self.status = "Error: annotation worker stopped unexpectedly".into();
                }
            }
            Message::DismissNotice => {
                self.notice = None;
            }
            Message::ConfidenceChanged(value) => {
                self.settings.confidence = value;
                self.settings.save();
            }
            Message::MinFaceSizeChanged(value) => {
                self.settings.min_face_size = value;
                self.settings.save();
            }
            Message::LandmarksToggled(enabled) => {
                self.settings.landmarks = enabled;
                self.settings.save();
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let enabled = self.accepts_input();

        let actions = row![
            button(text("Process default image"))
                .on_press_maybe(enabled.then_some(Message::ProcessDefault))
                .style(button::primary)
                .padding([8, 16]),
            button(text("Pick image\u{2026}"))
                .on_press_maybe(enabled.then_some(Message::PickImage))
                .style(button::secondary)
                .padding([8, 16]),
        ]
        .spacing(12);

        let options = row![
            text("Confidence").size(13),
            slider(0.05..=0.95, self.settings.confidence, Message::ConfidenceChanged)
                .step(0.05)
                .width(140),
            text(format!("{:.2}", self.settings.confidence)).size(13),
            Space::new().width(16),
            text("Min face").size(13),
            slider(0.0..=0.5, self.settings.min_face_size, Message::MinFaceSizeChanged)
                .step(0.01)
                .width(140),
            text(format!("{:.0}%", self.settings.min_face_size * 100.0)).size(13),
            Space::new().width(16),
            checkbox(self.settings.landmarks)
                .label("Landmarks")
                .on_toggle(Message::LandmarksToggled)
                .text_size(13),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);

        let canvas: Element<'_, Message> = match &self.displayed {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => center(text("No image yet").size(15)).into(),
        };

        let body: Element<'_, Message> = match &self.notice {
            Some(message) => center(
                container(
                    column![
                        text(message.as_str()).size(15),
                        button(text("OK"))
                            .on_press(Message::DismissNotice)
                            .padding([6, 20]),
                    ]
                    .spacing(16)
                    .align_x(iced::Alignment::Center),
                )
                .padding(24)
                .style(container::rounded_box),
            )
            .into(),
            None => container(canvas)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
        };

        let status = text(self.status.as_str()).size(12);

        column![actions, options, body, status]
            .spacing(12)
            .padding(16)
            .height(Length::Fill)
            .into()
    }

    /// Both actions stay disabled while a run or a notice is pending.
    fn accepts_input(&self) -> bool {
        !self.busy && self.notice.is_none()
    }

    fn start(&mut self, input: RunInput) -> Task<Message> {
        if self.busy || self.notice.is_some() {
            return Task::none();
        }
        self.busy = true;
        self.status = "Working\u{2026}".into();
        let updates = annotation_worker::spawn(input, self.settings.clone());
        Task::run(updates, |update| match update {
            WorkerMessage::DownloadProgress(downloaded, total) => {
                Message::DownloadProgress(downloaded, total)
            }
            WorkerMessage::Finished(report) => Message::RunFinished(report),
        })
        .chain(Task::done(Message::WorkerClosed))
    }

    fn finish(&mut self, report: RunReport) {
        self.busy = false;
        if let Some(image) = report.image {
            self.displayed = Some(to_handle(&image));
        }
        if let Some(notice) = report.notice {
            self.notice = Some(notice);
        }
        match report.outcome {
            Ok(Some(summary)) => {
                self.status = format!(
                    "{} face(s), {} landmark(s)",
                    summary.face_count, summary.landmark_count
                );
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("{e}");
                self.status = format!("Error: {e}");
            }
        }
    }
}

fn download_status(downloaded: u64, total: u64) -> String {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        format!("Downloading face detection model\u{2026} {pct}%")
    } else {
        format!("Downloading face detection model\u{2026} {downloaded} bytes")
    }
}

fn to_handle(image: &RasterImage) -> image::Handle {
    image::Handle::from_rgba(image.width(), image.height(), image.to_rgba_bytes())
}
