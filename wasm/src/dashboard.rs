//! Role-gated dashboard

use crate::api::ApiClient;
use crate::error::FormError;
use crate::forms::{AcceptanceForm, ClientForm, CommodityForm, DeliveryForm};
use shared::{Capability, Session};

/// Panels the dashboard can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    ClientRegistry,
    CommodityCatalog,
    StockAcceptance,
    StockDelivery,
}

impl FormKind {
    const GATED: [FormKind; 4] = [
        FormKind::ClientRegistry,
        FormKind::CommodityCatalog,
        FormKind::StockAcceptance,
        FormKind::StockDelivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Login => "login",
            FormKind::ClientRegistry => "client_registry",
            FormKind::CommodityCatalog => "commodity_catalog",
            FormKind::StockAcceptance => "stock_acceptance",
            FormKind::StockDelivery => "stock_delivery",
        }
    }

    fn capability(&self) -> Option<Capability> {
        match self {
            FormKind::Login => None,
            FormKind::ClientRegistry => Some(Capability::ManageClients),
            FormKind::CommodityCatalog => Some(Capability::ManageCatalog),
            FormKind::StockAcceptance => Some(Capability::AcceptStock),
            FormKind::StockDelivery => Some(Capability::DeliverStock),
        }
    }
}

/// Forms to render for `session`; only the login form without one
pub fn permitted_forms(session: Option<&Session>) -> Vec<FormKind> {
    match session {
        None => vec![FormKind::Login],
        Some(session) => FormKind::GATED
            .into_iter()
            .filter(|kind| kind.capability().map_or(false, |cap| session.role.can(cap)))
            .collect(),
    }
}

/// Forms of a logged-in user, each present only if the role allows it
pub struct Dashboard {
    api: ApiClient,
    session: Session,
    pub clients: Option<ClientForm>,
    pub catalog: Option<CommodityForm>,
    pub acceptance: Option<AcceptanceForm>,
    pub delivery: Option<DeliveryForm>,
}

impl Dashboard {
    pub fn new(base_url: &str, session: Session) -> Self {
        let forms = permitted_forms(Some(&session));
        let has = |kind| forms.contains(&kind);

        Self {
            api: ApiClient::new(base_url).with_session(&session),
            clients: has(FormKind::ClientRegistry).then(ClientForm::new),
            catalog: has(FormKind::CommodityCatalog).then(CommodityForm::new),
            acceptance: has(FormKind::StockAcceptance).then(AcceptanceForm::new),
            delivery: has(FormKind::StockDelivery).then(DeliveryForm::new),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn forms(&self) -> Vec<FormKind> {
        permitted_forms(Some(&self.session))
    }

    /// Fetch the reference data of every rendered form
    pub async fn load(&mut self) -> Result<(), FormError> {
        if let Some(form) = self.catalog.as_mut() {
            form.load(&self.api).await;
        }
        if let Some(form) = self.acceptance.as_mut() {
            form.load(&self.api).await;
        }
        if let Some(form) = self.delivery.as_mut() {
            form.load(&self.api).await;
        }
        if let Some(form) = self.clients.as_mut() {
            form.load(&self.api).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    fn session(role: Role) -> Session {
        Session {
            username: "user".to_string(),
            role,
        }
    }

    #[test]
    fn test_no_session_shows_login_only() {
        assert_eq!(permitted_forms(None), vec![FormKind::Login]);
    }

    #[test]
    fn test_forms_by_role() {
        assert_eq!(
            permitted_forms(Some(&session(Role::Admin))),
            FormKind::GATED.to_vec()
        );
        assert_eq!(
            permitted_forms(Some(&session(Role::Manager))),
            vec![
                FormKind::ClientRegistry,
                FormKind::StockAcceptance,
                FormKind::StockDelivery
            ]
        );
        assert_eq!(
            permitted_forms(Some(&session(Role::Staff))),
            vec![FormKind::StockAcceptance, FormKind::StockDelivery]
        );
    }

    #[test]
    fn test_dashboard_builds_only_permitted_forms() {
        let dashboard = Dashboard::new("http://127.0.0.1:5000", session(Role::Staff));
        assert!(dashboard.clients.is_none());
        assert!(dashboard.catalog.is_none());
        assert!(dashboard.acceptance.is_some());
        assert!(dashboard.delivery.is_some());
        assert_eq!(dashboard.forms().len(), 2);
    }
}
