pub(crate) const INSTANCES_YML: &str = r#"testapp.router:
  workdir: ./tmp/db_dev/3301
  advertise_uri: localhost:3301
  http_port: 8081

testapp.s1-master:
  workdir: ./tmp/db_dev/3302
  advertise_uri: localhost:3302
  http_port: 8082

testapp.s1-replica:
  workdir: ./tmp/db_dev/3303
  advertise_uri: localhost:3303
  http_port: 8083
"#;

pub(crate) const REPLICASETS_YML: &str = r#"app-router:
  instances: [router]
  roles: [vshard-router, app.roles.custom, app.roles.api_router]
  all_rw: false

s1-storage:
  instances: [s1-master, s1-replica]
  roles: [vshard-storage, app.roles.api_storage]
  weight: 1
  all_rw: false
  vshard_group: default
"#;

/// Reply of a probe that is satisfied
pub(crate) const TRUE_REPLY: &str = "---\n- true\n...\n";

/// Reply of a probe that is not satisfied yet
pub(crate) const NULL_REPLY: &str = "---\n- null\n...\n";

pub(crate) const COLLISION_REPLY: &str = r#"---
- null
- str: 'Error: collision with another server'
  err: collision with another server
  class_name: Error
...
"#;

pub(crate) const TOPOLOGY_ERROR_REPLY: &str = r#"---
- null
- str: 'EditTopologyError: replicaset s1-storage is not reachable'
  err: replicaset s1-storage is not reachable
  class_name: EditTopologyError
...
"#;
