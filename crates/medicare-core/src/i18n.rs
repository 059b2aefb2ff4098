//! Localized display strings.
//!
//! One static table per [`Language`]. Lookups never fail: every language
//! carries every string.

use crate::types::{Language, SectionId, Tab};

/// The fixed set of display strings for one language.
#[derive(Debug)]
pub struct Strings {
    pub welcome: &'static str,
    pub chat: &'static str,
    pub analysis: &'static str,
    pub research: &'static str,
    pub hero_title: &'static str,
    pub hero_subtitle: &'static str,
    pub features: [&'static str; 3],
    pub get_started: &'static str,
    pub disclaimer: &'static str,
    pub chat_placeholder: &'static str,
    pub suggested_questions: [&'static str; 3],
    pub thinking: &'static str,
    pub upload_or_capture: &'static str,
    pub drag_drop: &'static str,
    pub capture_image: &'static str,
    pub take_photo: &'static str,
    pub stop_camera: &'static str,
    pub analyzing: &'static str,
    pub extracted_text: &'static str,
    pub summary: &'static str,
    pub key_findings: &'static str,
    pub recommendations: &'static str,
    pub next_steps: &'static str,
    pub new_analysis: &'static str,
    pub search_placeholder: &'static str,
    pub research_topics: [&'static str; 3],
    pub searching: &'static str,
    pub copied: &'static str,
    pub copy: &'static str,
    pub ai_summary: &'static str,
    // Notices
    pub chat_failed: &'static str,
    pub analysis_failed: &'static str,
    pub research_failed: &'static str,
    pub camera_denied: &'static str,
    pub capture_failed: &'static str,
    pub file_too_large: &'static str,
}

impl Strings {
    pub fn tab_label(&self, tab: Tab) -> &'static str {
        match tab {
            Tab::Welcome => self.welcome,
            Tab::Chat => self.chat,
            Tab::Analysis => self.analysis,
            Tab::Research => self.research,
        }
    }

    pub fn section_label(&self, section: SectionId) -> &'static str {
        match section {
            SectionId::Summary => self.summary,
            SectionId::KeyFindings => self.key_findings,
            SectionId::Recommendations => self.recommendations,
            SectionId::NextSteps => self.next_steps,
        }
    }
}

static EN: Strings = Strings {
    welcome: "Welcome",
    chat: "Chat",
    analysis: "Analysis",
    research: "Research",
    hero_title: "Your Medical Assistant",
    hero_subtitle: "AI-powered health information and document analysis",
    features: [
        "Chat with AI about health topics",
        "Analyze medical documents",
        "Research medical information",
    ],
    get_started: "Get Started",
    disclaimer: "For informational purposes only - Always consult healthcare professionals",
    chat_placeholder: "Ask a medical question...",
    suggested_questions: [
        "Symptoms of malaria?",
        "What causes headaches?",
        "Diabetes management tips",
    ],
    thinking: "Thinking...",
    upload_or_capture: "Upload Document or Capture Image",
    drag_drop: "Drag & drop a file here, or click to select",
    capture_image: "Capture Image",
    take_photo: "Take Photo",
    stop_camera: "Stop Camera",
    analyzing: "Analyzing...",
    extracted_text: "Extracted Text",
    summary: "Summary",
    key_findings: "Key Findings",
    recommendations: "Recommendations",
    next_steps: "Next Steps",
    new_analysis: "New Analysis",
    search_placeholder: "Search medical topics...",
    research_topics: [
        "Diabetes guidelines",
        "Hypertension treatment",
        "Malaria prevention",
    ],
    searching: "Searching...",
    copied: "Copied!",
    copy: "Copy",
    ai_summary: "AI-Generated Summary",
    chat_failed: "Error sending message. Please try again.",
    analysis_failed: "Error analyzing document. Please try again.",
    research_failed: "Error fetching research. Please try again.",
    camera_denied: "Camera access denied. Please enable camera permissions.",
    capture_failed: "Could not capture the image. Please try again.",
    file_too_large: "File is too large to analyze.",
};

static FR: Strings = Strings {
    welcome: "Bienvenue",
    chat: "Discussion",
    analysis: "Analyse",
    research: "Recherche",
    hero_title: "Votre Assistant Médical",
    hero_subtitle: "Informations de santé et analyse de documents par IA",
    features: [
        "Discutez avec l'IA sur la santé",
        "Analysez des documents médicaux",
        "Recherchez des informations médicales",
    ],
    get_started: "Commencer",
    disclaimer: "À titre informatif uniquement - Consultez toujours des professionnels de santé",
    chat_placeholder: "Posez une question médicale...",
    suggested_questions: [
        "Symptômes du paludisme?",
        "Causes des maux de tête?",
        "Conseils diabète",
    ],
    thinking: "Réflexion...",
    upload_or_capture: "Télécharger un document ou capturer une image",
    drag_drop: "Glissez-déposez un fichier ici ou cliquez pour sélectionner",
    capture_image: "Capturer une image",
    take_photo: "Prendre la photo",
    stop_camera: "Arrêter la caméra",
    analyzing: "Analyse en cours...",
    extracted_text: "Texte extrait",
    summary: "Résumé",
    key_findings: "Résultats clés",
    recommendations: "Recommandations",
    next_steps: "Prochaines étapes",
    new_analysis: "Nouvelle analyse",
    search_placeholder: "Rechercher des sujets médicaux...",
    research_topics: [
        "Directives diabète",
        "Traitement hypertension",
        "Prévention paludisme",
    ],
    searching: "Recherche en cours...",
    copied: "Copié!",
    copy: "Copier",
    ai_summary: "Résumé généré par IA",
    chat_failed: "Erreur lors de l'envoi du message. Veuillez réessayer.",
    analysis_failed: "Erreur lors de l'analyse du document. Veuillez réessayer.",
    research_failed: "Erreur lors de la recherche. Veuillez réessayer.",
    camera_denied: "Accès à la caméra refusé. Veuillez autoriser la caméra.",
    capture_failed: "Impossible de capturer l'image. Veuillez réessayer.",
    file_too_large: "Le fichier est trop volumineux pour être analysé.",
};

/// The string table for `language`.
pub fn strings(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Fr => &FR,
    }
}
