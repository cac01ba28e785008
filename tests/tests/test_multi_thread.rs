// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use braid::{Braid, BraidObject};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_simple_multi_thread() {
    let braid = Arc::new(Braid::default());
    let src: HashSet<_> = [41, 42, 43, 45, 46, 47].into_iter().collect();
    // serialize
    let mut handles = vec![];
    for item in &src {
        let braid_clone = Arc::clone(&braid);
        let item = *item;
        let handle = thread::spawn(move || braid_clone.serialize(&item).unwrap());
        handles.push(handle);
    }
    let mut serialized_data = vec![];
    for handle in handles {
        serialized_data.push(handle.join().unwrap());
    }
    // deserialize
    let mut dest = HashSet::new();
    let mut handles = vec![];
    for bytes in serialized_data {
        let braid_clone = Arc::clone(&braid);
        let handle = thread::spawn(move || braid_clone.deserialize::<i32>(&bytes).unwrap());
        handles.push(handle);
    }
    for handle in handles {
        dest.insert(handle.join().unwrap());
    }
    assert_eq!(dest, src);
}

#[derive(BraidObject, Debug, PartialEq, Eq, Hash, Clone)]
struct Item {
    #[braid(id = "f1")]
    f1: i32,
    #[braid(id = "tags")]
    tags: Vec<String>,
}

#[test]
fn test_first_use_races() {
    let braid = Braid::default();
    braid.register::<Item>("Item").unwrap();
    let braid = Arc::new(braid);
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    // every thread builds the field table and codecs of `Item` at the same time
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let braid = Arc::clone(&braid);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let item = Item {
                    f1: i as i32,
                    tags: vec![format!("t{i}")],
                };
                barrier.wait();
                let bytes = braid.serialize(&item).unwrap();
                let dynamic = braid.deserialize_dyn(&bytes).unwrap();
                assert_eq!(dynamic.downcast_ref::<Item>(), Some(&item));
                braid.deserialize::<Item>(&bytes).unwrap()
            })
        })
        .collect();
    let dest: HashSet<Item> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(dest.len(), threads);
}

#[test]
fn test_register_while_serializing() {
    #[derive(BraidObject, Debug, PartialEq)]
    struct Late {
        #[braid(id = "v")]
        v: u8,
    }

    let braid = Arc::new(Braid::default());
    let writer = {
        let braid = Arc::clone(&braid);
        thread::spawn(move || {
            for i in 0..100u32 {
                let bytes = braid.serialize(&vec![i; 4]).unwrap();
                assert_eq!(braid.deserialize::<Vec<u32>>(&bytes).unwrap(), vec![i; 4]);
            }
        })
    };
    braid.register::<Late>("Late").unwrap();
    writer.join().unwrap();
    let bytes = braid.serialize(&Late { v: 9 }).unwrap();
    assert_eq!(braid.deserialize::<Late>(&bytes).unwrap(), Late { v: 9 });
}
