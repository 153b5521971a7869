use crate::model::WeatherView;

/// Whatever displays lookups to the user.
///
/// The controller calls these as terminal side effects and owns no rendering itself.
pub trait PresentationSink: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, message: &str);
    fn hide_error(&self);
    fn render(&self, view: &WeatherView);
    /// Hide the weather card.
    fn clear(&self);
}

impl<S: PresentationSink + ?Sized> PresentationSink for &S {
    fn show_loading(&self) {
        (**self).show_loading()
    }
    fn hide_loading(&self) {
        (**self).hide_loading()
    }
    fn show_error(&self, message: &str) {
        (**self).show_error(message)
    }
    fn hide_error(&self) {
        (**self).hide_error()
    }
    fn render(&self, view: &WeatherView) {
        (**self).render(view)
    }
    fn clear(&self) {
        (**self).clear()
    }
}
