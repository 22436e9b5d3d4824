//! Static content selection: résumé documents and external links.

use crate::config::ResumeConfig;
use crate::state::locale::{Language, Locale};
use crate::state::toast::{Toast, ToastQueue};
use crate::types::{ExternalLink, OpenTarget, Opener};

/// Document path for `language`.
pub fn resume_path(resume: &ResumeConfig, language: Language) -> &str {
    match language {
        Language::En => &resume.en,
        Language::Fr => &resume.fr,
    }
}

/// Open the résumé for `language` in a new context and confirm with a toast.
///
/// The toast is queued if the toaster has not loaded yet.
pub fn download_resume(
    resume: &ResumeConfig,
    language: Language,
    locale: &Locale,
    opener: &dyn Opener,
    toasts: &ToastQueue,
) {
    let link = ExternalLink::new(resume_path(resume, language));
    opener.open(&link.url, link.target);

    let description = match language {
        Language::En => locale.t("hero.toast.desc.en"),
        Language::Fr => locale.t("hero.toast.desc.fr"),
    };
    toasts.push(Toast::new(locale.t("hero.toast.title"), description));
}

/// Open an external link with its declared target.
pub fn open_link(link: &ExternalLink, opener: &dyn Opener) {
    if link.target == OpenTarget::SameContext {
        log::debug!(target: "folio::links", "opening {} in place", link.url);
    }
    opener.open(&link.url, link.target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::locale::MemoryStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingOpener {
        opened: RefCell<Vec<(String, OpenTarget)>>,
    }

    impl Opener for RecordingOpener {
        fn open(&self, url: &str, target: OpenTarget) {
            self.opened.borrow_mut().push((url.to_string(), target));
        }
    }

    #[test]
    fn test_resume_per_language() {
        let resume = ResumeConfig::default();
        assert_eq!(resume_path(&resume, Language::En), "/resume-en.pdf");
        assert_eq!(resume_path(&resume, Language::Fr), "/resume-fr.pdf");
    }

    #[test]
    fn test_download_opens_new_context_and_toasts() {
        let locale = Locale::builtin(MemoryStore::shared(), "lang", Language::En).unwrap();
        let opener = RecordingOpener::default();
        let toasts = ToastQueue::new();

        download_resume(&ResumeConfig::default(), Language::Fr, &locale, &opener, &toasts);

        assert_eq!(
            *opener.opened.borrow(),
            vec![("/resume-fr.pdf".to_string(), OpenTarget::NewContext)]
        );
        assert_eq!(toasts.queued_len(), 1);
    }

    #[test]
    fn test_open_link_respects_target() {
        let opener = RecordingOpener::default();
        let link = ExternalLink {
            url: "mailto:someone@example.com".into(),
            target: OpenTarget::SameContext,
        };
        open_link(&link, &opener);
        assert_eq!(opener.opened.borrow()[0].1, OpenTarget::SameContext);
    }
}
