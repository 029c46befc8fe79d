use std::collections::HashSet;

use log::info;

use crate::{api::FanboxClient, config::Config, error::Result, fanbox::Creator};

/// Resolve the creators to archive: explicit IDs win, otherwise the union
/// of the supporting and following lists minus the ignore list.
pub async fn resolve_creators(config: &Config, client: &FanboxClient) -> Result<Vec<Creator>> {
    let explicit = config.creators();
    if !explicit.is_empty() {
        let mut seen = HashSet::new();
        let mut creators = Vec::new();
        for id in explicit {
            if seen.insert(id.clone()) {
                creators.push(Creator::from_id(id.clone()));
            }
        }
        return Ok(creators);
    }

    let accepts = config.accepts();
    info!("Accepts:");
    for accept in accepts.list() {
        info!(" + {}", accept);
    }
    info!("");

    let mut creators: HashSet<Creator> = HashSet::new();
    info!("Checking creators");
    if accepts.accept_supporting() {
        let supporting = client.get_supporting_creators().await?;
        info!(" + Supporting: {} found", supporting.len());
        creators.extend(supporting.into_iter().map(|s| s.into()));
    }

    if accepts.accept_following() {
        let following = client.get_following_creators().await?;
        info!(" + Following: {} found", following.len());
        creators.extend(following.into_iter().map(|f| f.into()));
    }
    info!("");

    let total = creators.len();
    creators.retain(|c| !config.ignores(c.id()));
    let filtered = creators.len();
    info!("Total: {} creators", total);
    info!("Excluded: {} creators", total - filtered);
    info!("");

    let mut creators: Vec<Creator> = creators.into_iter().collect();
    creators.sort_by(|a, b| a.creator_id.cmp(&b.creator_id));
    Ok(creators)
}

pub fn display_creators(creators: &[Creator]) {
    if log::log_enabled!(log::Level::Info) {
        let (mut id_width, mut fee_width) = (11_usize, 5_usize);
        for creator in creators.iter() {
            id_width = creator.creator_id.len().max(id_width);
            fee_width = creator.fee.to_string().len().max(fee_width);
        }

        info!(
            "+-{:-<id_width$}-+-{:-<fee_width$}--+-{}------- - -",
            " CreatorId ", " Fee ", " Name "
        );
        for creator in creators.iter() {
            info!(
                "| {:id_width$} | {:fee_width$}$ | {}",
                creator.creator_id, creator.fee, creator.name
            );
        }
        info!(
            "+-{}-+-{}--+------------ - -",
            "-".repeat(id_width),
            "-".repeat(fee_width)
        );
        info!("");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn user(name: &str) -> serde_json::Value {
        json!({"iconUrl": null, "name": name, "userId": "1"})
    }

    async fn mount_lists(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/plan.listSupporting"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [
                    {"id": "p1", "title": "plan-a", "fee": 500, "user": user("A"), "creatorId": "a"},
                    {"id": "p2", "title": "plan-b", "fee": 300, "user": user("B"), "creatorId": "b"},
                ]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/creator.listFollowing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "body": [
                    {"user": user("B"), "creatorId": "b"},
                    {"user": user("C"), "creatorId": "c"},
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn union_collapses_duplicates_and_applies_ignores() {
        let server = MockServer::start().await;
        mount_lists(&server).await;

        let config = Config::for_tests().with_ignore(&["c"]);
        let client = FanboxClient::with_base_url("FANBOXSESSID=test".to_string(), server.uri());

        let creators = resolve_creators(&config, &client).await.unwrap();
        let ids: Vec<&str> = creators.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn supporting_creators_keep_their_fee_over_following_duplicates() {
        let server = MockServer::start().await;
        mount_lists(&server).await;

        let config = Config::for_tests();
        let client = FanboxClient::with_base_url("FANBOXSESSID=test".to_string(), server.uri());

        let creators = resolve_creators(&config, &client).await.unwrap();
        let b = creators.iter().find(|c| c.id() == "b").unwrap();
        assert_eq!(b.fee, 300, "the supported entry wins over its following duplicate");
    }

    #[tokio::test]
    async fn explicit_ids_skip_the_list_lookup() {
        let server = MockServer::start().await;

        let config = Config::for_tests().with_creators(&["alice", "alice", "bob"]);
        let client = FanboxClient::with_base_url("FANBOXSESSID=test".to_string(), server.uri());

        let creators = resolve_creators(&config, &client).await.unwrap();
        let ids: Vec<&str> = creators.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
