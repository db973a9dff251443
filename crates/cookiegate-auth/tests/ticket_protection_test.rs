//! Integration tests for scheme resolution and ticket protection.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};

use cookiegate_auth::defaults;
use cookiegate_auth::ticket::claim_types;
use cookiegate_auth::{
    AuthenticationProperties, AuthenticationTicket, ClaimsIdentity, ClaimsPrincipal,
    CookieAuthenticationOptions, KeyRing, KeyRingDataProtectionProvider, MasterKey,
    OptionsResolver,
};
use cookiegate_core::config::{DataProtectionConfig, KeySettings};
use cookiegate_core::error::ErrorKind;

fn ticket(name: &str) -> AuthenticationTicket {
    let identity = ClaimsIdentity::new("Cookies")
        .with_claim(claim_types::NAME_IDENTIFIER, format!("id-{name}"))
        .with_claim(claim_types::NAME, name)
        .with_claim(claim_types::ROLE, "member");
    AuthenticationTicket::new(
        ClaimsPrincipal::from_identity(identity),
        AuthenticationProperties::issued_for(Utc::now(), Duration::hours(2))
            .with_item("tenant", "acme"),
        "Cookies",
    )
}

fn resolve(resolver: &OptionsResolver, name: &str) -> CookieAuthenticationOptions {
    let mut options = CookieAuthenticationOptions::new();
    resolver.resolve(name, &mut options).expect("resolve");
    options
}

fn shared_key_config(key: &MasterKey) -> DataProtectionConfig {
    DataProtectionConfig {
        application_name: "shop".into(),
        keys: vec![KeySettings {
            id: key.id(),
            secret: key.secret_base64(),
        }],
        default_key: None,
    }
}

#[test]
fn test_bearer_scenario() {
    let resolver =
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")));
    let options = resolve(&resolver, "Bearer");
    let resolved = options.resolved().expect("resolved");

    assert_eq!(resolved.cookie_name, format!("{}Bearer", defaults::COOKIE_PREFIX));
    assert_eq!(
        resolved.ticket_data_format.purposes().segments(),
        [defaults::COMPONENT_ID, "Bearer", "v2"]
    );
    assert_eq!(resolved.login_path.as_str(), "/Account/Login");
    assert_eq!(resolved.logout_path.as_str(), "/Account/Logout");
    assert_eq!(resolved.access_denied_path.as_str(), "/Account/AccessDenied");
}

#[test]
fn test_round_trip_through_resolved_format() {
    let resolver =
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")));
    let options = resolve(&resolver, "Cookies");
    let format = options.resolved().expect("resolved").ticket_data_format;

    let original = ticket("dave");
    let value = format.protect(&original).expect("protect");
    let restored = format.unprotect(&value).expect("unprotect");

    assert_eq!(restored, original);
    assert_eq!(restored.principal.name(), Some("dave"));
    assert_eq!(restored.expires_utc(), original.expires_utc());
}

#[test]
fn test_cross_scheme_value_rejected() {
    let resolver =
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")));
    let first = resolve(&resolver, "first");
    let second = resolve(&resolver, "second");

    let value = first
        .ticket_data_format
        .as_ref()
        .unwrap()
        .protect(&ticket("erin"))
        .expect("protect");
    let err = second
        .ticket_data_format
        .as_ref()
        .unwrap()
        .unprotect(&value)
        .expect_err("cross scheme");
    assert_eq!(err.kind, ErrorKind::InvalidTicket);
}

#[test]
fn test_single_bit_flips_in_cookie_value_rejected() {
    let resolver =
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")));
    let options = resolve(&resolver, "Cookies");
    let format = options.ticket_data_format.as_ref().unwrap();
    let value = format.protect(&ticket("frank")).expect("protect");

    let bytes = value.as_bytes();
    for index in 0..bytes.len() {
        for bit in 0..7 {
            let mut tampered = bytes.to_vec();
            tampered[index] ^= 1 << bit;
            let Ok(tampered) = String::from_utf8(tampered) else {
                continue;
            };
            let err = format
                .unprotect(&tampered)
                .expect_err("tampered value must not verify");
            assert_eq!(err.kind, ErrorKind::InvalidTicket);
        }
    }
}

#[test]
fn test_replicas_with_shared_keys_interoperate() {
    let key = MasterKey::generate();
    let config = shared_key_config(&key);

    let replica_a = OptionsResolver::new(Arc::new(
        KeyRingDataProtectionProvider::from_config(&config).expect("provider"),
    ));
    let replica_b = OptionsResolver::new(Arc::new(
        KeyRingDataProtectionProvider::from_config(&config).expect("provider"),
    ));

    let issued = resolve(&replica_a, "Cookies")
        .ticket_data_format
        .unwrap()
        .protect(&ticket("gina"))
        .expect("protect");
    let restored = resolve(&replica_b, "Cookies")
        .ticket_data_format
        .unwrap()
        .unprotect(&issued)
        .expect("unprotect");
    assert_eq!(restored.principal.name(), Some("gina"));
}

#[test]
fn test_rotation_keeps_old_cookies_readable() {
    let old = MasterKey::generate();
    let before = OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::new(
        KeyRing::new(old.clone()),
        "shop",
    )));
    let issued = resolve(&before, "Cookies")
        .ticket_data_format
        .unwrap()
        .protect(&ticket("hank"))
        .expect("protect");

    let after = OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::new(
        KeyRing::new(MasterKey::generate()).with_retired(old),
        "shop",
    )));
    let restored = resolve(&after, "Cookies")
        .ticket_data_format
        .unwrap()
        .unprotect(&issued)
        .expect("unprotect");
    assert_eq!(restored.principal.name(), Some("hank"));
}

#[test]
fn test_concurrent_protect_and_unprotect() {
    let resolver =
        OptionsResolver::new(Arc::new(KeyRingDataProtectionProvider::ephemeral("test")));
    let options = Arc::new(resolve(&resolver, "Cookies"));

    thread::scope(|scope| {
        for worker in 0..8 {
            let options = Arc::clone(&options);
            scope.spawn(move || {
                let format = options.resolved().expect("resolved").ticket_data_format;
                for i in 0..25 {
                    let original = ticket(&format!("user-{worker}-{i}"));
                    let value = format.protect(&original).expect("protect");
                    assert_eq!(format.unprotect(&value).expect("unprotect"), original);
                }
            });
        }
    });
}
