// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Portal selector map.
//!
//! Static, versioned description of where things live on the two portal
//! stages: the gov.br authentication gateway and the deduction application
//! reached through the e-CAC services directory. Bump [`SELECTORS_VERSION`]
//! whenever an entry changes so screenshots can be matched to the map that
//! produced them.

/// Version tag of [`PORTAL`].
pub const SELECTORS_VERSION: &str = "2025.2";

/// How a page element is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector; the first match wins.
    Css(&'static str),
    /// ARIA role plus accessible name (exact, whitespace-trimmed).
    Role { role: &'static str, name: &'static str },
    /// Form control whose `<label>` or `aria-label` reads exactly this text.
    Label(&'static str),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "css={}", css),
            Locator::Role { role, name } => write!(f, "role={}[name=\"{}\"]", role, name),
            Locator::Label(label) => write!(f, "label=\"{}\"", label),
        }
    }
}

/// Authentication gateway.
#[derive(Debug, Clone, Copy)]
pub struct LoginSelectors {
    pub url: &'static str,
    /// Substring identifying any URL that still belongs to the login page.
    pub page_marker: &'static str,
    pub challenge: Locator,
    pub identity_input: Locator,
    pub identity_submit: Locator,
    pub secret_input: Locator,
    pub secret_submit: Locator,
    pub error_banner: Locator,
}

/// Services directory that links to the target application.
#[derive(Debug, Clone, Copy)]
pub struct DirectorySelectors {
    pub url: &'static str,
    pub search_input: Locator,
    /// Display name of the application, typed into the search field.
    pub app_name: &'static str,
    pub app_link: Locator,
}

/// Deduction form inside the application.
#[derive(Debug, Clone, Copy)]
pub struct DeductionSelectors {
    pub section_link: Locator,
    pub add_new: Locator,
    pub category: Locator,
    pub provider_tax_id: Locator,
    pub document_type: Locator,
    pub amount: Locator,
    pub save: Locator,
    pub confirm_modal: Locator,
    pub success_banner: Locator,
    pub error_banner: Locator,
}

#[derive(Debug, Clone, Copy)]
pub struct PortalSelectors {
    pub version: &'static str,
    pub login: LoginSelectors,
    pub directory: DirectorySelectors,
    pub deduction: DeductionSelectors,
}

impl PortalSelectors {
    /// Whether `url` still points at the authentication page.
    pub fn is_login_url(&self, url: &str) -> bool {
        url.contains(self.login.page_marker)
    }
}

pub const PORTAL: PortalSelectors = PortalSelectors {
    version: SELECTORS_VERSION,
    login: LoginSelectors {
        url: "https://sso.acesso.gov.br/login",
        page_marker: "sso.acesso.gov.br/login",
        challenge: Locator::Css("iframe[src*='hcaptcha'], div.h-captcha, #captcha-container"),
        identity_input: Locator::Css("#accountId"),
        identity_submit: Locator::Css("#enter-account-id"),
        secret_input: Locator::Css("#password"),
        secret_submit: Locator::Css("#submit-button"),
        error_banner: Locator::Css("#login-error-message, .br-message.danger"),
    },
    directory: DirectorySelectors {
        url: "https://cav.receita.fazenda.gov.br/ecac/",
        search_input: Locator::Css("#campoBuscaServico"),
        app_name: "Carnê-Leão",
        app_link: Locator::Role { role: "link", name: "Carnê-Leão" },
    },
    deduction: DeductionSelectors {
        section_link: Locator::Role { role: "link", name: "Pagamentos" },
        add_new: Locator::Role { role: "button", name: "Novo pagamento" },
        category: Locator::Label("Código da despesa"),
        provider_tax_id: Locator::Label("CPF/CNPJ do beneficiário"),
        document_type: Locator::Label("Tipo de documento"),
        amount: Locator::Label("Valor pago"),
        save: Locator::Role { role: "button", name: "Salvar" },
        confirm_modal: Locator::Role { role: "button", name: "Confirmar" },
        success_banner: Locator::Css(".br-message.success"),
        error_banner: Locator::Css(".br-message.danger, .alert-danger"),
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_detection() {
        assert!(PORTAL.is_login_url("https://sso.acesso.gov.br/login?client_id=x"));
        assert!(!PORTAL.is_login_url("https://cav.receita.fazenda.gov.br/ecac/"));
    }

    #[test]
    fn locator_display_is_readable() {
        assert_eq!(Locator::Css("#password").to_string(), "css=#password");
        assert_eq!(
            Locator::Role { role: "button", name: "Salvar" }.to_string(),
            "role=button[name=\"Salvar\"]"
        );
        assert_eq!(Locator::Label("Valor pago").to_string(), "label=\"Valor pago\"");
    }
}
