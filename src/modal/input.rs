/// Keys the modal reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Part of the modal a pointer click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    Prev,
    Next,
    Close,
    /// The overlay around the dialog.
    Backdrop,
    /// The image viewport; `offset_x` is measured from its left edge.
    Viewport { offset_x: f64, width: f64 },
    /// Anywhere else inside the dialog.
    Dialog,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalInput {
    Key(Key),
    Click(Region),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the gallery cursor by this many images.
    Step(isize),
    Close,
    Ignore,
}

/// The whole input table. A closed modal ignores everything.
pub fn action_for(is_open: bool, input: ModalInput) -> Action {
    if !is_open {
        return Action::Ignore;
    }
    match input {
        ModalInput::Key(Key::ArrowLeft) | ModalInput::Click(Region::Prev) => Action::Step(-1),
        ModalInput::Key(Key::ArrowRight) | ModalInput::Click(Region::Next) => Action::Step(1),
        ModalInput::Click(Region::Viewport { offset_x, width }) => {
            if offset_x < width / 2.0 {
                Action::Step(-1)
            } else {
                Action::Step(1)
            }
        }
        ModalInput::Key(Key::Escape)
        | ModalInput::Click(Region::Close)
        | ModalInput::Click(Region::Backdrop) => Action::Close,
        ModalInput::Key(Key::Other) | ModalInput::Click(Region::Dialog) => Action::Ignore,
    }
}
