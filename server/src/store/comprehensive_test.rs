//! Comprehensive test to verify the document store abstraction

#[cfg(test)]
mod integration_tests {
    use crate::model::{Collection, Like, LikeTarget, ObjectId, Playlist, PlaylistPatch, TargetKind, Video};
    use crate::service::playlist_service::PlaylistService;
    use crate::service::user_context::UserContext;
    use crate::store::mock_store::MockDocumentStore;
    use crate::store::repository::Repository;
    use crate::store::sqlite_store::SQLiteDocumentStore;
    use crate::store::{DocumentStore, Filter};
    use std::sync::Arc;

    fn backends() -> Vec<(&'static str, Arc<dyn DocumentStore>)> {
        vec![
            ("sqlite", Arc::new(SQLiteDocumentStore::open_in_memory().expect("open sqlite")) as Arc<dyn DocumentStore>),
            ("mock", Arc::new(MockDocumentStore::new()) as Arc<dyn DocumentStore>),
        ]
    }

    #[test]
    fn test_store_abstraction_end_to_end() {
        for (backend, store) in backends() {
            let playlists: Repository<Playlist> = Repository::new(store.clone());
            let owner = ObjectId::new();

            let first = playlists.create(Playlist::new(owner, "first".into(), "one".into())).unwrap();
            let second = playlists.create(Playlist::new(owner, "second".into(), "two".into())).unwrap();
            playlists.create(Playlist::new(ObjectId::new(), "other".into(), "x".into())).unwrap();

            let mine = playlists.find(&Filter::new().eq("owner", owner)).unwrap();
            assert_eq!(
                mine.iter().map(|p| p.id).collect::<Vec<_>>(),
                vec![first.id, second.id],
                "{}: find should keep insertion order",
                backend
            );

            let video = ObjectId::new();
            let patch = PlaylistPatch { videos: Some(vec![video]), ..Default::default() };
            let updated = playlists.update_by_id(&first.id, &patch).unwrap().unwrap();
            assert_eq!(updated.videos, vec![video], "{}: patch should apply", backend);
            assert_eq!(updated.name, "first", "{}: untouched fields survive", backend);

            let reread = playlists.find_by_id(&first.id).unwrap().unwrap();
            assert_eq!(reread, updated, "{}: update result should match stored record", backend);

            assert!(playlists.delete_by_id(&first.id).unwrap().is_some());
            assert!(playlists.find_by_id(&first.id).unwrap().is_none(), "{}: deleted", backend);
            assert!(playlists.delete_by_id(&first.id).unwrap().is_none(), "{}: second delete finds nothing", backend);
        }
    }

    #[test]
    fn test_toggle_round_trip_on_every_backend() {
        for (backend, store) in backends() {
            let likes: Repository<Like> = Repository::new(store.clone());
            let user = ObjectId::new();
            let target = LikeTarget { kind: TargetKind::Comment, id: ObjectId::new() };
            let by_pair = Filter::new()
                .eq("likedBy", user)
                .eq("target.kind", "comment")
                .eq("target.id", target.id);

            let added = likes.toggle(Like::new(user, target)).unwrap();
            assert!(added.is_added(), "{}: first toggle adds", backend);
            assert_eq!(likes.find(&by_pair).unwrap().len(), 1, "{}: one like stored", backend);

            let removed = likes.toggle(Like::new(user, target)).unwrap();
            assert!(!removed.is_added(), "{}: second toggle removes", backend);
            assert_eq!(removed.record().id, added.record().id, "{}: removes the stored like", backend);
            assert!(likes.find(&by_pair).unwrap().is_empty(), "{}: no like left", backend);
        }
    }

    #[test]
    fn test_concurrent_toggles_never_duplicate() {
        const THREADS: usize = 8;
        const TOGGLES_PER_THREAD: usize = 25;

        for (backend, store) in backends() {
            let user = ObjectId::new();
            let target = LikeTarget { kind: TargetKind::Video, id: ObjectId::new() };

            std::thread::scope(|scope| {
                for _ in 0..THREADS {
                    let likes: Repository<Like> = Repository::new(store.clone());
                    scope.spawn(move || {
                        for _ in 0..TOGGLES_PER_THREAD {
                            likes.toggle(Like::new(user, target)).expect("toggle");
                        }
                    });
                }
            });

            let remaining = store
                .find(Collection::Likes, &Filter::new().eq("likedBy", user))
                .unwrap()
                .len();
            assert!(remaining <= 1, "{}: at most one like per pair", backend);
            assert_eq!(remaining, (THREADS * TOGGLES_PER_THREAD) % 2, "{}: toggles are serialized", backend);
        }
    }

    #[test]
    fn test_concurrent_playlist_additions_are_all_kept() {
        const THREADS: usize = 8;
        const VIDEOS_PER_THREAD: usize = 8;

        for (backend, store) in backends() {
            let videos: Repository<Video> = Repository::new(store.clone());
            let service = PlaylistService::new(store.clone());
            let owner = UserContext::new(ObjectId::new());
            let playlist = service.create_playlist(&owner, Some("Mix"), Some("shared")).unwrap();
            let pid = playlist.id.to_string();

            let batches: Vec<Vec<ObjectId>> = (0..THREADS)
                .map(|_| {
                    (0..VIDEOS_PER_THREAD)
                        .map(|_| {
                            videos
                                .create(Video::new(ObjectId::new(), "t".into(), "d".into(), "v".into(), "i".into(), 1))
                                .unwrap()
                                .id
                        })
                        .collect()
                })
                .collect();

            std::thread::scope(|scope| {
                for batch in &batches {
                    let (service, owner, pid) = (&service, &owner, &pid);
                    scope.spawn(move || {
                        for video in batch {
                            service.add_video(owner, pid, &video.to_string()).expect("add video");
                        }
                    });
                }
            });

            let stored = service.get_playlist(&pid).unwrap();
            assert_eq!(stored.videos.len(), THREADS * VIDEOS_PER_THREAD, "{}: no addition lost", backend);
            for batch in &batches {
                let positions: Vec<usize> = batch
                    .iter()
                    .map(|v| stored.videos.iter().position(|s| s == v).expect("video kept"))
                    .collect();
                assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}: per-thread order kept", backend);
            }

            std::thread::scope(|scope| {
                for batch in &batches {
                    let (service, owner, pid) = (&service, &owner, &pid);
                    scope.spawn(move || {
                        for video in batch.iter().step_by(2) {
                            service.remove_video(owner, pid, &video.to_string()).expect("remove video");
                        }
                    });
                }
            });
            let remaining = service.get_playlist(&pid).unwrap().videos.len();
            assert_eq!(remaining, THREADS * VIDEOS_PER_THREAD / 2, "{}: no removal lost", backend);
        }
    }
}
